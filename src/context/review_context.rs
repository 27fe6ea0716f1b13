//! The cross-pass knowledge accumulator.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::types::{CodeElement, FileSummary, Finding};

/// Mutable record of what earlier passes of a review learned.
///
/// One instance belongs to one review session. Passes must run one after
/// another: each pass reads the accumulated state through
/// [`generate_next_pass_context`](Self::generate_next_pass_context) and then
/// adds to it. Everything is append-only except file summary lookup, where
/// the latest summary for a path wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewContext {
    pub(super) project_name: String,
    pub(super) review_type: String,
    pub(super) files: Vec<String>,
    pub(super) current_pass: u32,
    pub(super) code_elements: Vec<CodeElement>,
    pub(super) findings: Vec<Finding>,
    pub(super) file_summaries: Vec<FileSummary>,
    pub(super) general_notes: Vec<String>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl ReviewContext {
    /// Start a context for a review of `files` in `project_name`.
    pub fn new<I, S>(project_name: impl Into<String>, review_type: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        Self {
            project_name: project_name.into(),
            review_type: review_type.into(),
            files: files.into_iter().map(Into::into).collect(),
            current_pass: 0,
            code_elements: Vec::new(),
            findings: Vec::new(),
            file_summaries: Vec::new(),
            general_notes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn review_type(&self) -> &str {
        &self.review_type
    }

    /// Files the review was started with.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The pass currently running; 0 before the first pass starts.
    pub fn current_pass(&self) -> u32 {
        self.current_pass
    }

    /// Advance to the next pass and return its number.
    ///
    /// Panics if the counter is already at `u32::MAX`.
    /// [`from_json`](Self::from_json) refuses to restore such a context.
    pub fn start_pass(&mut self) -> u32 {
        self.current_pass += 1;
        self.touch();
        debug!(pass = self.current_pass, project = %self.project_name, "Starting review pass");
        self.current_pass
    }

    /// Record a code element.
    ///
    /// Importance must survive JSON, so NaN is stored as 0 and infinities
    /// are clamped to the largest finite values.
    pub fn add_code_element(&mut self, mut element: CodeElement) {
        if !element.importance.is_finite() {
            let clamped = if element.importance.is_nan() {
                0.0
            } else {
                element.importance.clamp(f64::MIN, f64::MAX)
            };
            debug!(
                element = %element.name,
                supplied = element.importance,
                stored = clamped,
                "Replacing non-finite code element importance"
            );
            element.importance = clamped;
        }
        self.code_elements.push(element);
        self.touch();
    }

    /// Record a finding, stamped with the current pass number.
    ///
    /// Any pass number set by the caller is replaced.
    pub fn add_finding(&mut self, mut finding: Finding) {
        if finding.pass_number != self.current_pass {
            debug!(
                supplied = finding.pass_number,
                current = self.current_pass,
                "Overriding caller-supplied pass number on finding"
            );
        }
        finding.pass_number = self.current_pass;
        self.findings.push(finding);
        self.touch();
    }

    /// Record a file summary, stamped with the current pass number.
    ///
    /// Earlier summaries for the same path stay in the history but are no
    /// longer returned by [`file_summary`](Self::file_summary).
    pub fn add_file_summary(&mut self, mut summary: FileSummary) {
        summary.pass_number = self.current_pass;
        self.file_summaries.push(summary);
        self.touch();
    }

    pub fn add_general_note(&mut self, note: impl Into<String>) {
        self.general_notes.push(note.into());
        self.touch();
    }

    pub fn code_elements(&self) -> Vec<CodeElement> {
        self.code_elements.clone()
    }

    pub fn findings(&self) -> Vec<Finding> {
        self.findings.clone()
    }

    /// The most recently added summary for `path`.
    pub fn file_summary(&self, path: &str) -> Option<FileSummary> {
        self.latest_summary(path).cloned()
    }

    /// Every summary ever recorded, including replaced ones.
    pub fn file_summaries(&self) -> Vec<FileSummary> {
        self.file_summaries.clone()
    }

    /// All summaries for `path`, oldest first.
    pub fn file_summary_history(&self, path: &str) -> Vec<FileSummary> {
        self.file_summaries
            .iter()
            .filter(|s| s.path == path)
            .cloned()
            .collect()
    }

    pub fn general_notes(&self) -> Vec<String> {
        self.general_notes.clone()
    }

    pub fn findings_for_file(&self, file: &str) -> Vec<Finding> {
        self.findings
            .iter()
            .filter(|f| f.file == file)
            .cloned()
            .collect()
    }

    pub fn findings_for_pass(&self, pass: u32) -> Vec<Finding> {
        self.findings
            .iter()
            .filter(|f| f.pass_number == pass)
            .cloned()
            .collect()
    }

    pub fn code_elements_for_file(&self, file: &str) -> Vec<CodeElement> {
        self.code_elements
            .iter()
            .filter(|e| e.file == file)
            .cloned()
            .collect()
    }

    pub(super) fn latest_summary(&self, path: &str) -> Option<&FileSummary> {
        self.file_summaries.iter().rev().find(|s| s.path == path)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
