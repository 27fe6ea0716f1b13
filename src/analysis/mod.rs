//! Token Analysis and Pass Planning
//!
//! This module measures how many tokens a set of files will consume for a
//! given model and decides whether a review fits in one pass or has to be
//! split across several.
//!
//! ## Budget
//!
//! The effective budget is the model's context window minus a reserved
//! overhead fraction for prompt scaffolding and the model's answer:
//!
//! ```text
//! effective_budget = floor(context_window * (1 - overhead_factor))
//! ```
//!
//! The overhead factor defaults to [`DEFAULT_OVERHEAD_FACTOR`] and can be
//! overridden per review type (see [`OverheadPolicy`]).
//!
//! ## Chunking
//!
//! When the total exceeds the budget, files are bin-packed greedily, largest
//! first, into chunks that each fit the budget. A file too large to fit on its
//! own is still returned, alone in a chunk flagged `oversized`; deciding what
//! to do with it is up to the caller.
//!
//! ## Usage
//!
//! ```
//! use revpass::analysis::{AnalysisOptions, FileInput, TokenAnalyzer};
//!
//! let analyzer = TokenAnalyzer::with_defaults();
//! let files = vec![FileInput::new("/repo/src/lib.rs", "src/lib.rs", "pub fn answer() -> u32 { 42 }")];
//! let analysis = analyzer.analyze_files(&files, &AnalysisOptions::new("quick-fixes", "gemini-1.5-pro"));
//!
//! assert!(!analysis.chunking_recommendation.chunking_recommended);
//! assert_eq!(analysis.estimated_passes_needed, 1);
//! ```

mod analyzer;
mod budget;
mod chunking;
mod types;

pub use analyzer::TokenAnalyzer;
pub use budget::{
    ContextBudget, DEFAULT_OVERHEAD_FACTOR, OverheadPolicy, effective_budget,
    validate_overhead_factor,
};
pub use chunking::plan_chunks;
pub use types::{
    AggregateAnalysis, AnalysisOptions, Chunk, ChunkingRecommendation, FileInput, FileRef,
    FileTokenAnalysis,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert!(DEFAULT_OVERHEAD_FACTOR > 0.0 && DEFAULT_OVERHEAD_FACTOR < 1.0);
        assert!(validate_overhead_factor(DEFAULT_OVERHEAD_FACTOR).is_ok());
    }
}
