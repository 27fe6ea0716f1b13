//! BPE tokenizers backed by `tiktoken-rs`.
//!
//! Vocabularies are loaded on first use and cached per tokenizer instance.
//! If loading fails the tokenizer stays usable and counts with
//! [`approximate_tokens`](super::approximate_tokens) instead.

use std::fmt;
use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;
use tracing::warn;

use super::{Tokenizer, approximate_tokens, name_contains};

/// The BPE vocabularies the built-in tokenizers can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpeEncoding {
    /// GPT-4 / GPT-3.5 vocabulary.
    Cl100kBase,
    /// GPT-4o and o-series vocabulary.
    O200kBase,
}

impl BpeEncoding {
    fn load(self) -> anyhow::Result<CoreBPE> {
        let loaded = match self {
            BpeEncoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            BpeEncoding::O200kBase => tiktoken_rs::o200k_base(),
        };
        loaded.map_err(|e| anyhow::anyhow!("failed to load {} vocabulary: {}", self, e))
    }
}

impl fmt::Display for BpeEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BpeEncoding::Cl100kBase => write!(f, "cl100k_base"),
            BpeEncoding::O200kBase => write!(f, "o200k_base"),
        }
    }
}

/// A vocabulary that is loaded at most once.
struct LazyBpe {
    encoding: BpeEncoding,
    bpe: OnceLock<Option<CoreBPE>>,
}

impl LazyBpe {
    fn new(encoding: BpeEncoding) -> Self {
        Self {
            encoding,
            bpe: OnceLock::new(),
        }
    }

    #[cfg(test)]
    fn unavailable(encoding: BpeEncoding) -> Self {
        Self {
            encoding,
            bpe: OnceLock::from(None),
        }
    }

    fn get(&self) -> Option<&CoreBPE> {
        self.bpe
            .get_or_init(|| match self.encoding.load() {
                Ok(bpe) => Some(bpe),
                Err(err) => {
                    warn!(
                        encoding = %self.encoding,
                        error = %err,
                        "Tokenization degraded, falling back to character approximation"
                    );
                    None
                }
            })
            .as_ref()
    }

    fn count(&self, text: &str) -> usize {
        match self.get() {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => approximate_tokens(text),
        }
    }

    fn is_degraded(&self) -> bool {
        self.get().is_none()
    }
}

/// Strip an optional `provider:` prefix and lowercase the rest.
fn model_stem(model_name: &str) -> String {
    model_name
        .rsplit(':')
        .next()
        .unwrap_or(model_name)
        .trim()
        .to_lowercase()
}

/// OpenAI models.
///
/// Two instances are normally registered: [`GptTokenizer::o200k`] claims the
/// GPT-4o, GPT-4.1, GPT-5 and o-series names; [`GptTokenizer::cl100k`]
/// claims every other name containing `gpt`.
pub struct GptTokenizer {
    inner: LazyBpe,
}

impl GptTokenizer {
    /// Tokenizer for models using the `cl100k_base` vocabulary.
    pub fn cl100k() -> Self {
        Self {
            inner: LazyBpe::new(BpeEncoding::Cl100kBase),
        }
    }

    /// Tokenizer for models using the `o200k_base` vocabulary.
    pub fn o200k() -> Self {
        Self {
            inner: LazyBpe::new(BpeEncoding::O200kBase),
        }
    }

    /// The vocabulary this instance counts with.
    pub fn encoding(&self) -> BpeEncoding {
        self.inner.encoding
    }

    /// Whether the vocabulary failed to load and counts are approximated.
    pub fn is_degraded(&self) -> bool {
        self.inner.is_degraded()
    }
}

impl Tokenizer for GptTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.inner.count(text)
    }

    fn model_name(&self) -> &str {
        match self.inner.encoding {
            BpeEncoding::Cl100kBase => "cl100k_base",
            BpeEncoding::O200kBase => "o200k_base",
        }
    }

    fn supports_model(&self, model_name: &str) -> bool {
        let stem = model_stem(model_name);
        let o200k_family = ["gpt-4o", "gpt-4.1", "gpt-5"]
            .iter()
            .any(|prefix| stem.starts_with(prefix))
            || ["o1", "o3", "o4"].iter().any(|prefix| {
                stem == *prefix || stem.starts_with(&format!("{}-", prefix))
            });

        match self.inner.encoding {
            BpeEncoding::O200kBase => o200k_family,
            BpeEncoding::Cl100kBase => name_contains(&stem, "gpt"),
        }
    }
}

impl fmt::Debug for GptTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GptTokenizer")
            .field("encoding", &self.inner.encoding)
            .finish()
    }
}

/// Anthropic models.
///
/// Anthropic ships no offline vocabulary; `cl100k_base` is used as a proxy,
/// which lands close to the real count for source code.
pub struct ClaudeTokenizer {
    inner: LazyBpe,
}

impl ClaudeTokenizer {
    pub fn new() -> Self {
        Self {
            inner: LazyBpe::new(BpeEncoding::Cl100kBase),
        }
    }

    /// Whether the proxy vocabulary failed to load.
    pub fn is_degraded(&self) -> bool {
        self.inner.is_degraded()
    }
}

impl Default for ClaudeTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for ClaudeTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.inner.count(text)
    }

    fn model_name(&self) -> &str {
        "claude"
    }

    fn supports_model(&self, model_name: &str) -> bool {
        name_contains(model_name, "claude")
    }
}

impl fmt::Debug for ClaudeTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeTokenizer").finish()
    }
}
