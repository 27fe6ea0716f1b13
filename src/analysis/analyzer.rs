//! Token analyzer: per-file counts, aggregate totals and the pass plan.

use rayon::prelude::*;
use tracing::{debug, warn};

use super::budget::{ContextBudget, OverheadPolicy, validate_overhead_factor};
use super::chunking::plan_chunks;
use super::types::{
    AggregateAnalysis, AnalysisOptions, Chunk, ChunkingRecommendation, FileInput,
    FileTokenAnalysis,
};
use crate::models::ModelRegistry;
use crate::tokenizer::{Tokenizer, TokenizerRegistry};

/// Measures token load for a model and proposes a chunk/pass plan.
///
/// The analyzer holds no mutable state; the same inputs always produce the
/// same analysis.
#[derive(Debug)]
pub struct TokenAnalyzer {
    tokenizers: TokenizerRegistry,
    models: ModelRegistry,
    overhead: OverheadPolicy,
}

impl TokenAnalyzer {
    pub fn new(tokenizers: TokenizerRegistry, models: ModelRegistry, overhead: OverheadPolicy) -> Self {
        Self {
            tokenizers,
            models,
            overhead,
        }
    }

    /// Analyzer with the built-in tokenizers, the built-in model catalogue and
    /// the default overhead factor.
    pub fn with_defaults() -> Self {
        Self::new(
            TokenizerRegistry::with_defaults(),
            ModelRegistry::with_builtin_models(),
            OverheadPolicy::default(),
        )
    }

    pub fn tokenizers(&self) -> &TokenizerRegistry {
        &self.tokenizers
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Count the tokens of a single file.
    pub fn analyze_file(&self, file: &FileInput, options: &AnalysisOptions) -> FileTokenAnalysis {
        let tokenizer = self.tokenizers.resolve(&options.model_name);
        analyze_with(tokenizer, file)
    }

    /// Resolve the context window and effective budget for `options`.
    pub fn budget_for(&self, options: &AnalysisOptions) -> ContextBudget {
        let (context_window, known_model) = match self.models.context_window(&options.model_name) {
            Some(window) => (window, true),
            None => {
                debug!(
                    model = %options.model_name,
                    default = crate::models::DEFAULT_CONTEXT_WINDOW,
                    "Unknown model, using default context window"
                );
                (crate::models::DEFAULT_CONTEXT_WINDOW, false)
            }
        };

        let policy_factor = || self.overhead.factor_for(&options.review_type);
        let overhead_factor = match options.overhead_factor.map(validate_overhead_factor) {
            Some(Ok(factor)) => factor,
            Some(Err(err)) => {
                warn!(error = %err, "Ignoring invalid overhead factor, using the review type default");
                policy_factor()
            }
            None => policy_factor(),
        };

        ContextBudget::new(context_window, known_model, overhead_factor)
    }

    /// Analyze every file and decide whether the review needs multiple passes.
    pub fn analyze_files(&self, files: &[FileInput], options: &AnalysisOptions) -> AggregateAnalysis {
        let tokenizer = self.tokenizers.resolve(&options.model_name);

        // Files share no state, so order-preserving parallel collection gives
        // the same result as a sequential loop.
        let analyses: Vec<FileTokenAnalysis> = files
            .par_iter()
            .map(|file| analyze_with(tokenizer, file))
            .collect();

        let total_tokens: usize = analyses.iter().map(|a| a.token_count).sum();
        let total_size_in_bytes: usize = analyses.iter().map(|a| a.size_in_bytes).sum();
        let budget = self.budget_for(options);

        let chunking_recommendation = if budget.fits(total_tokens) {
            let mut chunk = Chunk::default();
            for analysis in &analyses {
                chunk.push(analysis.file_ref());
            }
            ChunkingRecommendation {
                chunking_recommended: false,
                recommended_chunks: vec![chunk],
                reason: format!(
                    "{} tokens fit within the {} token budget; a single pass is enough",
                    total_tokens, budget.effective_budget
                ),
            }
        } else {
            let chunks = plan_chunks(&analyses, budget.effective_budget);
            ChunkingRecommendation {
                chunking_recommended: true,
                reason: format!(
                    "{} tokens exceed the {} token budget ({} context window, {:.0}% reserved); split into {} chunks",
                    total_tokens,
                    budget.effective_budget,
                    budget.context_window,
                    budget.overhead_factor * 100.0,
                    chunks.len()
                ),
                recommended_chunks: chunks,
            }
        };

        let estimated_passes_needed = chunking_recommendation.recommended_chunks.len().max(1);

        let analysis = AggregateAnalysis {
            file_count: analyses.len(),
            files: analyses,
            total_tokens,
            total_size_in_bytes,
            chunking_recommendation,
            estimated_passes_needed,
            model_name: options.model_name.clone(),
            tokenizer_name: tokenizer.model_name().to_string(),
            context_window: budget.context_window,
            overhead_factor: budget.overhead_factor,
            effective_budget: budget.effective_budget,
            context_utilization: budget.utilization(total_tokens),
        };

        debug!(summary = %analysis.summary(), "Token analysis complete");
        analysis
    }
}

impl Default for TokenAnalyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn analyze_with(tokenizer: &dyn Tokenizer, file: &FileInput) -> FileTokenAnalysis {
    FileTokenAnalysis::new(file, tokenizer.count_tokens(&file.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_CONTEXT_WINDOW, ModelInfo};

    /// One token per character, so tests can reason about exact counts.
    struct CharTokenizer;

    impl Tokenizer for CharTokenizer {
        fn count_tokens(&self, text: &str) -> usize {
            text.chars().count()
        }
        fn model_name(&self) -> &str {
            "chars"
        }
        fn supports_model(&self, model_name: &str) -> bool {
            model_name.starts_with("test-")
        }
    }

    fn analyzer_with_window(model: &str, window: usize) -> TokenAnalyzer {
        let mut models = ModelRegistry::new();
        models.register(ModelInfo::new(model, window));
        TokenAnalyzer::new(
            TokenizerRegistry::new().with_tokenizer(CharTokenizer),
            models,
            OverheadPolicy::default(),
        )
    }

    fn files(count: usize, chars: usize) -> Vec<FileInput> {
        (0..count)
            .map(|i| {
                FileInput::new(
                    format!("/project/src/file{}.ts", i),
                    format!("src/file{}.ts", i),
                    "x".repeat(chars),
                )
            })
            .collect()
    }

    #[test]
    fn test_analyze_file() {
        let analyzer = analyzer_with_window("test-model", 10_000);
        let options = AnalysisOptions::new("quick-fixes", "test-model");
        let file = FileInput::new("/p/a.rs", "a.rs", "abcdefghij");

        let analysis = analyzer.analyze_file(&file, &options);
        assert_eq!(analysis.token_count, 10);
        assert_eq!(analysis.size_in_bytes, 10);
        assert!((analysis.tokens_per_byte - 1.0).abs() < f64::EPSILON);
        assert_eq!(analysis.relative_path, "a.rs");
    }

    #[test]
    fn test_analyze_file_is_deterministic() {
        let analyzer = TokenAnalyzer::with_defaults();
        let options = AnalysisOptions::new("security", "gpt-4o");
        let file = FileInput::new("/p/a.rs", "a.rs", "pub fn add(a: i32, b: i32) -> i32 { a + b }");
        assert_eq!(
            analyzer.analyze_file(&file, &options),
            analyzer.analyze_file(&file, &options)
        );
    }

    #[test]
    fn test_multi_pass_plan_for_small_window() {
        // 5 files x 3000 tokens against a 10k window (8500 budget)
        let analyzer = analyzer_with_window("test-model", 10_000);
        let options = AnalysisOptions::new("quick-fixes", "test-model");
        let input = files(5, 3000);

        let analysis = analyzer.analyze_files(&input, &options);
        let rec = &analysis.chunking_recommendation;

        assert_eq!(analysis.total_tokens, 15_000);
        assert_eq!(analysis.effective_budget, 8_500);
        assert!(rec.chunking_recommended);
        assert!(rec.recommended_chunks.len() > 1);
        assert_eq!(analysis.estimated_passes_needed, rec.recommended_chunks.len());
        for chunk in &rec.recommended_chunks {
            assert!(chunk.estimated_token_count <= 9_000);
        }
        for file in &input {
            let hits = rec
                .recommended_chunks
                .iter()
                .filter(|c| c.contains(&file.path))
                .count();
            assert_eq!(hits, 1, "{} should appear exactly once", file.path);
        }
    }

    #[test]
    fn test_single_pass_for_large_window() {
        let analyzer = analyzer_with_window("test-huge", 1_000_000);
        let options = AnalysisOptions::new("quick-fixes", "test-huge");
        let input = files(3, 12);

        let analysis = analyzer.analyze_files(&input, &options);
        let rec = &analysis.chunking_recommendation;

        assert!(!rec.chunking_recommended);
        assert_eq!(analysis.estimated_passes_needed, 1);
        assert_eq!(rec.recommended_chunks.len(), 1);
        assert_eq!(rec.recommended_chunks[0].file_count(), 3);
        assert_eq!(rec.recommended_chunks[0].estimated_token_count, 36);
    }

    #[test]
    fn test_single_pass_keeps_input_order() {
        let analyzer = analyzer_with_window("test-model", 10_000);
        let options = AnalysisOptions::new("quick-fixes", "test-model");
        let input = vec![
            FileInput::new("/p/b.rs", "b.rs", "bb"),
            FileInput::new("/p/a.rs", "a.rs", "aaaa"),
        ];
        let analysis = analyzer.analyze_files(&input, &options);
        assert_eq!(
            analysis.chunking_recommendation.recommended_chunks[0].paths(),
            vec!["/p/b.rs", "/p/a.rs"]
        );
    }

    #[test]
    fn test_empty_file_list() {
        let analyzer = analyzer_with_window("test-model", 10_000);
        let options = AnalysisOptions::new("quick-fixes", "test-model");

        let analysis = analyzer.analyze_files(&[], &options);
        assert_eq!(analysis.total_tokens, 0);
        assert_eq!(analysis.file_count, 0);
        assert!(!analysis.chunking_recommendation.chunking_recommended);
        assert_eq!(analysis.chunking_recommendation.recommended_chunks.len(), 1);
        assert!(analysis.chunking_recommendation.recommended_chunks[0].is_empty());
        assert_eq!(analysis.estimated_passes_needed, 1);
    }

    #[test]
    fn test_empty_file_occupies_slot() {
        let analyzer = analyzer_with_window("test-model", 100);
        let options = AnalysisOptions::new("quick-fixes", "test-model");
        let input = vec![
            FileInput::new("/p/big.rs", "big.rs", "x".repeat(80)),
            FileInput::new("/p/other.rs", "other.rs", "x".repeat(80)),
            FileInput::new("/p/empty.rs", "empty.rs", ""),
        ];

        let analysis = analyzer.analyze_files(&input, &options);
        let rec = &analysis.chunking_recommendation;
        assert!(rec.chunking_recommended);
        assert!(rec.recommended_chunks.iter().any(|c| c.contains("/p/empty.rs")));
    }

    #[test]
    fn test_budget_boundary_is_inclusive() {
        let analyzer = analyzer_with_window("test-model", 100);
        let options = AnalysisOptions::new("quick-fixes", "test-model");
        // 85 tokens == floor(100 * 0.85)
        let input = vec![FileInput::new("/p/a.rs", "a.rs", "x".repeat(85))];
        let analysis = analyzer.analyze_files(&input, &options);
        assert!(!analysis.chunking_recommendation.chunking_recommended);

        let input = vec![FileInput::new("/p/a.rs", "a.rs", "x".repeat(86))];
        let analysis = analyzer.analyze_files(&input, &options);
        assert!(analysis.chunking_recommendation.chunking_recommended);
        assert_eq!(analysis.oversized_chunks().len(), 1);
        assert!(!analysis.is_feasible());
    }

    #[test]
    fn test_unknown_model_uses_default_window() {
        let analyzer = TokenAnalyzer::with_defaults();
        let options = AnalysisOptions::new("quick-fixes", "some-local-model");
        let budget = analyzer.budget_for(&options);
        assert_eq!(budget.context_window, DEFAULT_CONTEXT_WINDOW);
        assert!(!budget.known_model);

        let analysis = analyzer.analyze_files(&files(1, 40), &options);
        assert_eq!(analysis.tokenizer_name, "fallback");
        assert_eq!(analysis.total_tokens, 10);
    }

    #[test]
    fn test_review_type_overhead() {
        let mut models = ModelRegistry::new();
        models.register(ModelInfo::new("test-model", 10_000));
        let policy = OverheadPolicy::default()
            .with_override("architectural", 0.5)
            .unwrap();
        let analyzer = TokenAnalyzer::new(TokenizerRegistry::new(), models, policy);

        let arch = analyzer.budget_for(&AnalysisOptions::new("architectural", "test-model"));
        assert_eq!(arch.effective_budget, 5_000);

        let quick = analyzer.budget_for(&AnalysisOptions::new("quick-fixes", "test-model"));
        assert_eq!(quick.effective_budget, 8_500);

        let forced = analyzer.budget_for(
            &AnalysisOptions::new("architectural", "test-model").with_overhead_factor(0.0),
        );
        assert_eq!(forced.effective_budget, 10_000);
    }

    #[test]
    fn test_invalid_forced_overhead_falls_back_to_policy() {
        let analyzer = analyzer_with_window("test-model", 100);

        for factor in [-1.0, 1.0, 1.5, f64::NAN, f64::INFINITY] {
            let options = AnalysisOptions::new("quick-fixes", "test-model").with_overhead_factor(factor);
            let budget = analyzer.budget_for(&options);
            assert_eq!(budget.overhead_factor, 0.15);
            assert_eq!(budget.effective_budget, 85);

            let analysis = analyzer.analyze_files(&files(2, 40), &options);
            assert!(!analysis.chunking_recommendation.chunking_recommended);
            assert!(analysis.is_feasible());
        }
    }

    #[test]
    fn test_summary_mentions_passes() {
        let analyzer = analyzer_with_window("test-model", 10_000);
        let options = AnalysisOptions::new("quick-fixes", "test-model");
        let analysis = analyzer.analyze_files(&files(5, 3000), &options);
        let summary = analysis.summary();
        assert!(summary.contains("5 files"));
        assert!(summary.contains("15000 tokens"));
        assert!(summary.contains("pass(es)"));
    }
}
