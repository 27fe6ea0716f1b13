//! Model metadata: provider dispatch and context window lookup.
//!
//! The [`ModelRegistry`] is an explicitly constructed lookup table. It starts
//! from a built-in catalogue and can be extended with entries from
//! `revpass.toml`. Lookups are case-insensitive and accept an optional
//! `provider:` prefix (`gemini:gemini-1.5-pro`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Context window assumed for models the registry does not know.
pub const DEFAULT_CONTEXT_WINDOW: usize = 100_000;

/// The backend family a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAi,
    Anthropic,
    Gemini,
    OpenRouter,
    /// Anything not recognised from the name.
    Unknown,
}

impl ModelProvider {
    /// Resolve the provider from a model name.
    ///
    /// An explicit `provider:` prefix takes precedence; otherwise the family
    /// is inferred from well-known substrings. Pure, no side effects.
    ///
    /// ```
    /// use revpass::models::ModelProvider;
    ///
    /// assert_eq!(ModelProvider::from_model_name("gemini:gemini-1.5-pro"), ModelProvider::Gemini);
    /// assert_eq!(ModelProvider::from_model_name("claude-3-opus"), ModelProvider::Anthropic);
    /// assert_eq!(ModelProvider::from_model_name("llama3"), ModelProvider::Unknown);
    /// ```
    pub fn from_model_name(model_name: &str) -> Self {
        let lower = model_name.trim().to_lowercase();

        if let Some((prefix, _)) = lower.split_once(':') {
            match prefix {
                "openai" => return ModelProvider::OpenAi,
                "anthropic" => return ModelProvider::Anthropic,
                "gemini" | "google" => return ModelProvider::Gemini,
                "openrouter" => return ModelProvider::OpenRouter,
                _ => {}
            }
        }

        let stem = lower.rsplit(':').next().unwrap_or(&lower);
        if stem.contains("gpt")
            || ["o1", "o3", "o4"]
                .iter()
                .any(|p| stem == *p || stem.starts_with(&format!("{}-", p)))
        {
            ModelProvider::OpenAi
        } else if stem.contains("claude") {
            ModelProvider::Anthropic
        } else if stem.contains("gemini") {
            ModelProvider::Gemini
        } else {
            ModelProvider::Unknown
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelProvider::OpenAi => "openai",
            ModelProvider::Anthropic => "anthropic",
            ModelProvider::Gemini => "gemini",
            ModelProvider::OpenRouter => "openrouter",
            ModelProvider::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Metadata for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name without a provider prefix.
    pub name: String,
    /// Maximum tokens accepted per request (prompt + response).
    pub context_window: usize,
    /// Provider, inferred from the name when omitted in configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ModelProvider>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, context_window: usize) -> Self {
        Self {
            name: name.into(),
            context_window,
            provider: None,
        }
    }

    /// The declared provider, or the one inferred from the name.
    pub fn provider(&self) -> ModelProvider {
        self.provider
            .unwrap_or_else(|| ModelProvider::from_model_name(&self.name))
    }
}

/// Built-in catalogue of common review models.
const BUILTIN_MODELS: &[(&str, usize)] = &[
    ("gpt-4o", 128_000),
    ("gpt-4o-mini", 128_000),
    ("gpt-4.1", 1_047_576),
    ("gpt-4-turbo", 128_000),
    ("gpt-4", 8_192),
    ("gpt-3.5-turbo", 16_385),
    ("o1", 200_000),
    ("o3", 200_000),
    ("o3-mini", 200_000),
    ("claude-3-opus", 200_000),
    ("claude-3-sonnet", 200_000),
    ("claude-3-haiku", 200_000),
    ("claude-3-5-sonnet", 200_000),
    ("claude-3-5-haiku", 200_000),
    ("claude-3-7-sonnet", 200_000),
    ("claude-sonnet-4", 200_000),
    ("claude-opus-4", 200_000),
    ("gemini-1.5-pro", 2_097_152),
    ("gemini-1.5-flash", 1_048_576),
    ("gemini-2.0-flash", 1_048_576),
    ("gemini-2.5-pro", 1_048_576),
    ("gemini-2.5-flash", 1_048_576),
];

/// Case-insensitive model lookup table.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<ModelInfo>,
}

impl ModelRegistry {
    /// An empty registry; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in catalogue.
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::new();
        for (name, window) in BUILTIN_MODELS {
            registry.register(ModelInfo::new(*name, *window));
        }
        registry
    }

    /// Add or replace a model entry.
    pub fn register(&mut self, info: ModelInfo) {
        let key = normalize(&info.name);
        match self.models.iter_mut().find(|m| normalize(&m.name) == key) {
            Some(existing) => *existing = info,
            None => self.models.push(info),
        }
    }

    /// Look up a model by name.
    ///
    /// Tries an exact match first, then the longest known name that prefixes
    /// the requested one, so dated snapshots such as
    /// `claude-3-5-sonnet-20241022` resolve to their family entry.
    pub fn lookup(&self, model_name: &str) -> Option<&ModelInfo> {
        let key = normalize(model_name);
        if key.is_empty() {
            return None;
        }

        self.models
            .iter()
            .find(|m| normalize(&m.name) == key)
            .or_else(|| {
                self.models
                    .iter()
                    .filter(|m| key.starts_with(&format!("{}-", normalize(&m.name))))
                    .max_by_key(|m| m.name.len())
            })
    }

    /// Context window for `model_name`, if known.
    pub fn context_window(&self, model_name: &str) -> Option<usize> {
        self.lookup(model_name).map(|m| m.context_window)
    }

    /// Context window for `model_name`, or [`DEFAULT_CONTEXT_WINDOW`].
    pub fn context_window_or_default(&self, model_name: &str) -> usize {
        self.context_window(model_name)
            .unwrap_or(DEFAULT_CONTEXT_WINDOW)
    }

    /// All registered models in registration order.
    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }
}

fn normalize(model_name: &str) -> String {
    let lower = model_name.trim().to_lowercase();
    lower.rsplit(':').next().unwrap_or(&lower).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_prefix() {
        assert_eq!(
            ModelProvider::from_model_name("openrouter:anthropic/claude-3-opus"),
            ModelProvider::OpenRouter
        );
        assert_eq!(
            ModelProvider::from_model_name("OpenAI:gpt-4o"),
            ModelProvider::OpenAi
        );
    }

    #[test]
    fn test_provider_from_substring() {
        assert_eq!(ModelProvider::from_model_name("gpt-4"), ModelProvider::OpenAi);
        assert_eq!(ModelProvider::from_model_name("o3-mini"), ModelProvider::OpenAi);
        assert_eq!(
            ModelProvider::from_model_name("Gemini-2.0-Flash"),
            ModelProvider::Gemini
        );
        assert_eq!(ModelProvider::from_model_name(""), ModelProvider::Unknown);
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(ModelProvider::OpenAi.to_string(), "openai");
        assert_eq!(ModelProvider::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_builtin_lookup() {
        let registry = ModelRegistry::with_builtin_models();
        assert_eq!(registry.context_window("gpt-4"), Some(8_192));
        assert_eq!(registry.context_window("GPT-4o"), Some(128_000));
        assert_eq!(
            registry.context_window("gemini:gemini-1.5-pro"),
            Some(2_097_152)
        );
    }

    #[test]
    fn test_lookup_prefers_longest_prefix() {
        let registry = ModelRegistry::with_builtin_models();
        // "gpt-4o-mini-2024-07-18" must not resolve to "gpt-4" or "gpt-4o".
        let info = registry.lookup("gpt-4o-mini-2024-07-18").unwrap();
        assert_eq!(info.name, "gpt-4o-mini");
        let info = registry.lookup("claude-3-5-sonnet-20241022").unwrap();
        assert_eq!(info.name, "claude-3-5-sonnet");
    }

    #[test]
    fn test_unknown_model_uses_default() {
        let registry = ModelRegistry::with_builtin_models();
        assert_eq!(registry.context_window("llama3-70b"), None);
        assert_eq!(
            registry.context_window_or_default("llama3-70b"),
            DEFAULT_CONTEXT_WINDOW
        );
        assert_eq!(registry.context_window(""), None);
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = ModelRegistry::with_builtin_models();
        let before = registry.models().len();
        registry.register(ModelInfo::new("GPT-4", 32_768));
        assert_eq!(registry.models().len(), before);
        assert_eq!(registry.context_window("gpt-4"), Some(32_768));

        registry.register(ModelInfo::new("local-llama", 8_000));
        assert_eq!(registry.models().len(), before + 1);
        assert_eq!(
            registry.lookup("local-llama").unwrap().provider(),
            ModelProvider::Unknown
        );
    }
}
