//! Typed error hierarchy for revpass.
//!
//! Only one operation in the core is allowed to fail: restoring a persisted
//! review context. Tokenizer faults are recovered locally and oversized
//! files are reported as data on the chunk plan, so neither has an error type.

use thiserror::Error;

/// Errors raised when a persisted review context cannot be restored.
#[derive(Debug, Error)]
pub enum ContextDeserializationError {
    #[error("Review context is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Review context must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("Review context is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("Review context field '{field}' is malformed: {message}")]
    InvalidField { field: &'static str, message: String },
}

impl ContextDeserializationError {
    /// Name of the offending top-level field, when the error concerns one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Describe the JSON type of a value for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
