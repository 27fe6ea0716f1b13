//! Token-budgeted planning and cross-pass memory for multi-pass LLM code reviews.
//!
//! - [`tokenizer`]: model-aware token counting with a pluggable registry
//! - [`models`]: context windows of known models
//! - [`analysis`]: per-file token counts, budgets and chunk plans
//! - [`context`]: what earlier review passes learned, and the primer for the next one
//! - [`config`]: `revpass.toml` loading

pub mod analysis;
pub mod config;
pub mod context;
pub mod errors;
pub mod models;
pub mod tokenizer;
pub mod util;
