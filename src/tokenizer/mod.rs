//! Token counting per model family.
//!
//! A [`TokenizerRegistry`] maps a model name onto a [`Tokenizer`]. Family
//! tokenizers are tried in registration order and the first one whose
//! [`Tokenizer::supports_model`] returns true wins. When nothing matches,
//! the registry hands out its [`FallbackTokenizer`], which approximates one
//! token per four characters.
//!
//! Counting never fails. A family tokenizer that cannot load its vocabulary
//! logs a warning and degrades to the same character approximation.
//!
//! ## Example
//!
//! ```
//! use revpass::tokenizer::TokenizerRegistry;
//!
//! let registry = TokenizerRegistry::with_defaults();
//! assert_eq!(registry.resolve("gemini-1.5-pro").model_name(), "gemini");
//! assert_eq!(registry.resolve("some-local-model").model_name(), "fallback");
//! ```

mod approx;
mod bpe;

pub use approx::{FallbackTokenizer, GeminiTokenizer, approximate_tokens};
pub use bpe::{BpeEncoding, ClaudeTokenizer, GptTokenizer};

use std::fmt;

/// Average number of characters per token used by every approximation.
pub const CHARS_PER_TOKEN: usize = 4;

/// A token counting strategy for one model family.
pub trait Tokenizer: Send + Sync {
    /// Count the tokens in `text`. Must not fail or panic.
    fn count_tokens(&self, text: &str) -> usize;

    /// Name of the family or encoding this tokenizer implements.
    fn model_name(&self) -> &str;

    /// Whether this tokenizer handles `model_name`.
    fn supports_model(&self, model_name: &str) -> bool;
}

/// Ordered collection of family tokenizers with a catch-all fallback.
pub struct TokenizerRegistry {
    tokenizers: Vec<Box<dyn Tokenizer>>,
    fallback: FallbackTokenizer,
}

impl TokenizerRegistry {
    /// Create a registry with no family tokenizers; everything resolves to
    /// the fallback until tokenizers are registered.
    pub fn new() -> Self {
        Self {
            tokenizers: Vec::new(),
            fallback: FallbackTokenizer,
        }
    }

    /// Create a registry with the built-in GPT, Claude and Gemini tokenizers.
    ///
    /// The `o200k_base` GPT tokenizer is registered ahead of the `cl100k_base`
    /// one so newer OpenAI models pick up the newer vocabulary.
    pub fn with_defaults() -> Self {
        Self::new()
            .with_tokenizer(GptTokenizer::o200k())
            .with_tokenizer(GptTokenizer::cl100k())
            .with_tokenizer(ClaudeTokenizer::new())
            .with_tokenizer(GeminiTokenizer)
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.register(Box::new(tokenizer));
        self
    }

    /// Append a family tokenizer. It is consulted after every tokenizer
    /// registered before it and always before the fallback.
    pub fn register(&mut self, tokenizer: Box<dyn Tokenizer>) {
        self.tokenizers.push(tokenizer);
    }

    /// Find the tokenizer for `model_name`.
    pub fn resolve(&self, model_name: &str) -> &dyn Tokenizer {
        self.tokenizers
            .iter()
            .find(|t| t.supports_model(model_name))
            .map(|t| t.as_ref())
            .unwrap_or(&self.fallback)
    }

    /// Count tokens in `text` using the tokenizer for `model_name`.
    pub fn count_tokens(&self, text: &str, model_name: &str) -> usize {
        self.resolve(model_name).count_tokens(text)
    }

    /// Names of the registered family tokenizers, in resolution order.
    pub fn tokenizer_names(&self) -> Vec<&str> {
        self.tokenizers.iter().map(|t| t.model_name()).collect()
    }

    /// Number of registered family tokenizers (the fallback is not counted).
    pub fn len(&self) -> usize {
        self.tokenizers.len()
    }

    /// Whether no family tokenizers are registered.
    pub fn is_empty(&self) -> bool {
        self.tokenizers.is_empty()
    }
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for TokenizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizerRegistry")
            .field("tokenizers", &self.tokenizer_names())
            .field("fallback", &self.fallback.model_name())
            .finish()
    }
}

/// Case-insensitive substring match used by the family tokenizers.
pub(crate) fn name_contains(model_name: &str, needle: &str) -> bool {
    model_name.to_lowercase().contains(needle)
}
