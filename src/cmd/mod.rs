//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled      |
//! |-----------|-----------------------|
//! | `analyze` | `Analyze`             |
//! | `context` | `Context`             |
//! | `models`  | `Models`              |
//! | `config`  | `Config`              |

pub mod analyze;
pub mod config;
pub mod context;
pub mod models;

pub use analyze::cmd_analyze;
pub use config::cmd_config;
pub use context::cmd_context_show;
pub use models::cmd_models;
