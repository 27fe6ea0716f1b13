//! Inputs and outputs of token analysis.

use serde::{Deserialize, Serialize};

/// A source file handed to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    /// Absolute (or caller-defined) path of the file.
    pub path: String,
    /// Path relative to the project root, used in prompts.
    pub relative_path: String,
    /// Full file content.
    pub content: String,
}

impl FileInput {
    pub fn new(
        path: impl Into<String>,
        relative_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
            content: content.into(),
        }
    }
}

/// Per-call analysis options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Review type, used to pick the overhead factor.
    pub review_type: String,
    /// Model the review will run against.
    pub model_name: String,
    /// Overhead factor that overrides the configured policy for this call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overhead_factor: Option<f64>,
}

impl AnalysisOptions {
    pub fn new(review_type: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            review_type: review_type.into(),
            model_name: model_name.into(),
            overhead_factor: None,
        }
    }

    /// Force a specific overhead factor for this analysis.
    ///
    /// Values outside `[0.0, 1.0)` are ignored by the analyzer, which then
    /// uses the review type's factor.
    pub fn with_overhead_factor(mut self, factor: f64) -> Self {
        self.overhead_factor = Some(factor);
        self
    }
}

/// Token accounting for one file. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTokenAnalysis {
    pub path: String,
    pub relative_path: String,
    pub token_count: usize,
    /// UTF-8 byte length of the content.
    pub size_in_bytes: usize,
    /// `token_count / size_in_bytes`, or 0 for empty files.
    pub tokens_per_byte: f64,
}

impl FileTokenAnalysis {
    pub(crate) fn new(file: &FileInput, token_count: usize) -> Self {
        let size_in_bytes = file.content.len();
        let tokens_per_byte = if size_in_bytes == 0 {
            0.0
        } else {
            token_count as f64 / size_in_bytes as f64
        };

        Self {
            path: file.path.clone(),
            relative_path: file.relative_path.clone(),
            token_count,
            size_in_bytes,
            tokens_per_byte,
        }
    }

    /// A lightweight reference to this file for chunk membership.
    pub fn file_ref(&self) -> FileRef {
        FileRef {
            path: self.path.clone(),
            relative_path: self.relative_path.clone(),
            token_count: self.token_count,
        }
    }
}

/// A file's identity and weight inside a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub path: String,
    pub relative_path: String,
    pub token_count: usize,
}

/// A token-bounded subset of files assigned to a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub files: Vec<FileRef>,
    pub estimated_token_count: usize,
    /// True when this chunk holds a single file that exceeds the budget alone.
    #[serde(default)]
    pub oversized: bool,
}

impl Chunk {
    pub(crate) fn push(&mut self, file: FileRef) {
        self.estimated_token_count += file.token_count;
        self.files.push(file);
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether the chunk contains the file with this path.
    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    /// Paths of the files in this chunk, in chunk order.
    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Whether to split the review and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingRecommendation {
    pub chunking_recommended: bool,
    pub recommended_chunks: Vec<Chunk>,
    /// Human-readable explanation of the decision.
    pub reason: String,
}

/// Aggregate token analysis for a review, derived entirely from its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateAnalysis {
    pub files: Vec<FileTokenAnalysis>,
    pub total_tokens: usize,
    pub total_size_in_bytes: usize,
    pub file_count: usize,
    pub chunking_recommendation: ChunkingRecommendation,
    pub estimated_passes_needed: usize,
    /// Model the analysis was computed for.
    pub model_name: String,
    /// Tokenizer that produced the counts.
    pub tokenizer_name: String,
    /// Raw context window of the model.
    pub context_window: usize,
    /// Fraction of the window reserved for prompt scaffolding and output.
    pub overhead_factor: f64,
    /// Tokens available for file content per pass.
    pub effective_budget: usize,
    /// `total_tokens / effective_budget`.
    pub context_utilization: f64,
}

impl AggregateAnalysis {
    /// Chunks holding a file that cannot fit the budget even alone.
    pub fn oversized_chunks(&self) -> Vec<&Chunk> {
        self.chunking_recommendation
            .recommended_chunks
            .iter()
            .filter(|c| c.oversized)
            .collect()
    }

    /// Whether every file fits within the budget of some pass.
    pub fn is_feasible(&self) -> bool {
        self.oversized_chunks().is_empty()
    }

    /// One-line status for logging.
    pub fn summary(&self) -> String {
        format!(
            "{} files, {} tokens ({:.1}% of {} token budget for {}), {} pass(es){}",
            self.file_count,
            self.total_tokens,
            self.context_utilization * 100.0,
            self.effective_budget,
            self.model_name,
            self.estimated_passes_needed,
            if self.is_feasible() {
                String::new()
            } else {
                format!(", {} oversized", self.oversized_chunks().len())
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_per_byte() {
        let file = FileInput::new("/p/a.rs", "a.rs", "abcdefgh");
        let analysis = FileTokenAnalysis::new(&file, 2);
        assert_eq!(analysis.size_in_bytes, 8);
        assert!((analysis.tokens_per_byte - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tokens_per_byte_empty_file() {
        let file = FileInput::new("/p/empty.rs", "empty.rs", "");
        let analysis = FileTokenAnalysis::new(&file, 0);
        assert_eq!(analysis.size_in_bytes, 0);
        assert_eq!(analysis.tokens_per_byte, 0.0);
    }

    #[test]
    fn test_size_is_utf8_bytes() {
        let file = FileInput::new("/p/u.txt", "u.txt", "é");
        let analysis = FileTokenAnalysis::new(&file, 1);
        assert_eq!(analysis.size_in_bytes, 2);
    }

    #[test]
    fn test_chunk_push_accumulates() {
        let mut chunk = Chunk::default();
        assert!(chunk.is_empty());
        chunk.push(FileRef {
            path: "/p/a.rs".into(),
            relative_path: "a.rs".into(),
            token_count: 10,
        });
        chunk.push(FileRef {
            path: "/p/b.rs".into(),
            relative_path: "b.rs".into(),
            token_count: 5,
        });
        assert_eq!(chunk.estimated_token_count, 15);
        assert_eq!(chunk.file_count(), 2);
        assert!(chunk.contains("/p/b.rs"));
        assert_eq!(chunk.paths(), vec!["/p/a.rs", "/p/b.rs"]);
    }

    #[test]
    fn test_options_builder() {
        let options = AnalysisOptions::new("security", "gpt-4o").with_overhead_factor(0.3);
        assert_eq!(options.review_type, "security");
        assert_eq!(options.overhead_factor, Some(0.3));
    }

    #[test]
    fn test_chunk_serializes_camel_case() {
        let chunk = Chunk::default();
        let json = serde_json::to_value(&chunk).unwrap();
        assert!(json.get("estimatedTokenCount").is_some());
        assert!(json.get("oversized").is_some());
    }
}
