//! Cross-Pass Review Context
//!
//! A multi-pass review sends each chunk of files to the model separately.
//! [`ReviewContext`] accumulates what each pass learns so the next pass can
//! be primed with it:
//!
//! - **Findings**: issues reported by the model, stamped with the pass that
//!   recorded them
//! - **Code elements**: functions, classes and other structure worth knowing
//!   about in later passes
//! - **File summaries**: one current summary per file, with history kept
//! - **General notes**: free-form observations, in order
//!
//! ## Usage
//!
//! ```
//! use revpass::context::{Finding, FindingSeverity, ReviewContext};
//!
//! let mut ctx = ReviewContext::new("shop", "security", ["src/a.ts", "src/b.ts"]);
//!
//! ctx.start_pass();
//! ctx.add_finding(Finding::new("security", "Hardcoded API key", "src/a.ts", FindingSeverity::Critical));
//!
//! ctx.start_pass();
//! let primer = ctx.generate_next_pass_context(&["src/b.ts"]);
//! assert!(primer.contains("Hardcoded API key"));
//!
//! let restored = ReviewContext::from_json(&ctx.to_json()).unwrap();
//! assert_eq!(restored.current_pass(), 2);
//! ```

mod persist;
mod primer;
mod review_context;
mod types;

pub use primer::MAX_PRIMER_CODE_ELEMENTS;
pub use review_context::ReviewContext;
pub use types::{CodeElement, CodeElementType, FileSummary, Finding, FindingSeverity};
