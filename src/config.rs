//! Configuration for revpass.
//!
//! Settings are read from `.revpass/revpass.toml` or `revpass.toml` in the
//! project directory and can be overridden from the command line.
//!
//! # Configuration File Format
//!
//! ```toml
//! [defaults]
//! model = "gemini-1.5-pro"
//! review_type = "quick-fixes"
//! overhead_factor = 0.15
//!
//! [review_types.overrides."arch*"]
//! overhead_factor = 0.25
//!
//! [[models]]
//! name = "local-llama"
//! context_window = 32768
//! ```
//!
//! Review type overrides are glob patterns (`*`, `?`) matched without regard
//! to case. When several patterns match, the one that sorts last wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::analysis::{
    AnalysisOptions, DEFAULT_OVERHEAD_FACTOR, OverheadPolicy, TokenAnalyzer,
    validate_overhead_factor,
};
use crate::models::{ModelInfo, ModelRegistry};
use crate::tokenizer::TokenizerRegistry;

/// Config file locations, in lookup order, relative to the project directory.
pub const CONFIG_PATHS: &[&str] = &[".revpass/revpass.toml", "revpass.toml"];

/// Default settings for every review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Model reviews run against
    #[serde(default = "default_model")]
    pub model: String,
    /// Review type when none is given
    #[serde(default = "default_review_type")]
    pub review_type: String,
    /// Fraction of the context window reserved for prompt and response
    #[serde(default = "default_overhead_factor")]
    pub overhead_factor: f64,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_review_type() -> String {
    "quick-fixes".to_string()
}

fn default_overhead_factor() -> f64 {
    DEFAULT_OVERHEAD_FACTOR
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            review_type: default_review_type(),
            overhead_factor: default_overhead_factor(),
        }
    }
}

/// Review-type specific settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewTypeOverride {
    /// Override overhead factor for matching review types
    #[serde(default)]
    pub overhead_factor: Option<f64>,
}

/// Review type override section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewTypesConfig {
    /// Pattern-based overrides (e.g., "arch*" -> ReviewTypeOverride)
    #[serde(default)]
    pub overrides: BTreeMap<String, ReviewTypeOverride>,
}

/// The complete revpass.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevpassToml {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub review_types: ReviewTypesConfig,
    /// Extra models, or corrected context windows for built-in ones
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

impl RevpassToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse revpass.toml")
    }

    /// Find the config file for a project directory, if any.
    pub fn locate(project_dir: &Path) -> Option<PathBuf> {
        CONFIG_PATHS
            .iter()
            .map(|p| project_dir.join(p))
            .find(|p| p.is_file())
    }

    /// Load configuration from the project directory.
    /// Returns default configuration if no config file exists.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        match Self::locate(project_dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize revpass.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Build the overhead policy. Invalid factors are skipped with a warning.
    pub fn overhead_policy(&self) -> OverheadPolicy {
        let mut policy = match OverheadPolicy::new(self.defaults.overhead_factor) {
            Ok(policy) => policy,
            Err(err) => {
                warn!(error = %err, "Ignoring invalid default overhead_factor");
                OverheadPolicy::default()
            }
        };

        for (pattern, override_cfg) in &self.review_types.overrides {
            let Some(factor) = override_cfg.overhead_factor else {
                continue;
            };
            policy = match policy.clone().with_override(pattern, factor) {
                Ok(updated) => updated,
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "Ignoring invalid overhead_factor override");
                    policy
                }
            };
        }

        policy
    }

    /// Built-in models plus the ones declared in the file.
    pub fn model_registry(&self) -> ModelRegistry {
        let mut registry = ModelRegistry::with_builtin_models();
        for model in &self.models {
            registry.register(model.clone());
        }
        registry
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Err(err) = validate_overhead_factor(self.defaults.overhead_factor) {
            warnings.push(format!("Invalid default overhead_factor: {}", err));
        }

        for (pattern, override_cfg) in &self.review_types.overrides {
            if let Some(factor) = override_cfg.overhead_factor
                && let Err(err) = validate_overhead_factor(factor)
            {
                warnings.push(format!(
                    "Invalid overhead_factor in override for pattern '{}': {}",
                    pattern, err
                ));
            }
        }

        for model in &self.models {
            if model.name.trim().is_empty() {
                warnings.push("Model entry with an empty name".to_string());
            }
            if model.context_window == 0 {
                warnings.push(format!("Model '{}' has a zero context window", model.name));
            }
        }

        warnings
    }
}

/// Configuration that combines revpass.toml with command-line overrides.
#[derive(Debug, Clone)]
pub struct RevpassConfig {
    /// Path to the project directory
    pub project_dir: PathBuf,
    /// Parsed revpass.toml configuration
    pub toml: RevpassToml,
    /// CLI override for the model
    pub cli_model: Option<String>,
    /// CLI override for the review type
    pub cli_review_type: Option<String>,
    /// CLI override for the overhead factor
    pub cli_overhead_factor: Option<f64>,
}

impl RevpassConfig {
    /// Load configuration for a project directory.
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let toml = RevpassToml::load_or_default(&project_dir)?;
        Ok(Self {
            project_dir,
            toml,
            cli_model: None,
            cli_review_type: None,
            cli_overhead_factor: None,
        })
    }

    /// Load configuration and apply command-line overrides.
    pub fn with_cli_args(
        project_dir: PathBuf,
        model: Option<String>,
        review_type: Option<String>,
        overhead_factor: Option<f64>,
    ) -> Result<Self> {
        if let Some(factor) = overhead_factor {
            validate_overhead_factor(factor)?;
        }
        let mut config = Self::new(project_dir)?;
        config.cli_model = model;
        config.cli_review_type = review_type;
        config.cli_overhead_factor = overhead_factor;
        Ok(config)
    }

    /// Model name (CLI → file → default).
    pub fn model(&self) -> &str {
        self.cli_model
            .as_deref()
            .unwrap_or(&self.toml.defaults.model)
    }

    /// Review type (CLI → file → default).
    pub fn review_type(&self) -> &str {
        self.cli_review_type
            .as_deref()
            .unwrap_or(&self.toml.defaults.review_type)
    }

    /// Options for analyzing this project's files.
    pub fn analysis_options(&self) -> AnalysisOptions {
        let options = AnalysisOptions::new(self.review_type(), self.model());
        match self.cli_overhead_factor {
            Some(factor) => options.with_overhead_factor(factor),
            None => options,
        }
    }

    /// An analyzer wired with this configuration's models and overhead policy.
    pub fn analyzer(&self) -> TokenAnalyzer {
        TokenAnalyzer::new(
            TokenizerRegistry::with_defaults(),
            self.toml.model_registry(),
            self.toml.overhead_policy(),
        )
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
