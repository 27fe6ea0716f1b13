//! Character-based token approximations.

use super::{CHARS_PER_TOKEN, Tokenizer, name_contains};

/// Approximate the token count of `text` as `ceil(chars / 4)`.
pub fn approximate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Catch-all tokenizer used when no family tokenizer claims a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTokenizer;

impl Tokenizer for FallbackTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        approximate_tokens(text)
    }

    fn model_name(&self) -> &str {
        "fallback"
    }

    fn supports_model(&self, _model_name: &str) -> bool {
        true
    }
}

/// Gemini models. Google publishes no offline vocabulary, so this counts
/// with the character approximation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiTokenizer;

impl Tokenizer for GeminiTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        approximate_tokens(text)
    }

    fn model_name(&self) -> &str {
        "gemini"
    }

    fn supports_model(&self, model_name: &str) -> bool {
        name_contains(model_name, "gemini")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_rounds_up() {
        assert_eq!(approximate_tokens(""), 0);
        assert_eq!(approximate_tokens("a"), 1);
        assert_eq!(approximate_tokens("abcd"), 1);
        assert_eq!(approximate_tokens("abcde"), 2);
        assert_eq!(approximate_tokens(&"x".repeat(3000)), 750);
    }

    #[test]
    fn test_approximate_counts_chars_not_bytes() {
        // Four multi-byte characters are still one token.
        assert_eq!(approximate_tokens("ééé€"), 1);
    }

    #[test]
    fn test_fallback_supports_everything() {
        assert!(FallbackTokenizer.supports_model(""));
        assert!(FallbackTokenizer.supports_model("anything-at-all"));
    }

    #[test]
    fn test_gemini_support_is_case_insensitive() {
        assert!(GeminiTokenizer.supports_model("Gemini-1.5-Pro"));
        assert!(GeminiTokenizer.supports_model("gemini:gemini-2.0-flash"));
        assert!(!GeminiTokenizer.supports_model("gpt-4"));
        assert_eq!(GeminiTokenizer.count_tokens("hello world!"), 3);
    }
}
