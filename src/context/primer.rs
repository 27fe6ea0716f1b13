//! Text injected into the next pass's prompt.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

use super::review_context::ReviewContext;
use super::types::{CodeElement, Finding};

/// Maximum number of code elements listed in a primer.
pub const MAX_PRIMER_CODE_ELEMENTS: usize = 20;

impl ReviewContext {
    /// Build the primer for the pass that will review `files_for_next_pass`.
    ///
    /// The primer carries every finding recorded so far (grouped by pass),
    /// the latest summary of each upcoming file that has one, the most
    /// important code elements in those files, and all general notes. It is
    /// the only memory the next model invocation gets of earlier passes.
    pub fn generate_next_pass_context<S: AsRef<str>>(&self, files_for_next_pass: &[S]) -> String {
        let mut text = String::new();

        text.push_str("## MULTI-PASS REVIEW CONTEXT\n\n");
        let _ = writeln!(
            text,
            "This review is split into multiple passes. Current pass: {}.",
            self.current_pass
        );
        if !self.project_name.is_empty() {
            let _ = write!(text, "Project: {}", self.project_name);
            if !self.review_type.is_empty() {
                let _ = write!(text, " ({} review)", self.review_type);
            }
            text.push('\n');
        }
        text.push('\n');

        self.write_findings(&mut text);
        self.write_summaries(&mut text, files_for_next_pass);
        self.write_code_elements(&mut text, files_for_next_pass);

        if !self.general_notes.is_empty() {
            text.push_str("### Notes\n\n");
            for note in &self.general_notes {
                let _ = writeln!(text, "- {}", note);
            }
            text.push('\n');
        }

        text.push_str(
            "Build on these results. Do not repeat findings that were already reported.\n",
        );
        text
    }

    fn write_findings(&self, text: &mut String) {
        text.push_str("### Findings From Previous Passes\n\n");
        if self.findings.is_empty() {
            text.push_str("No findings recorded yet.\n\n");
            return;
        }

        let mut by_pass: BTreeMap<u32, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            by_pass.entry(finding.pass_number).or_default().push(finding);
        }

        for (pass, findings) in by_pass {
            let _ = writeln!(text, "#### Pass {}\n", pass);
            for f in findings {
                let _ = writeln!(
                    text,
                    "- [{}] {} in {}: {}",
                    f.severity.to_string().to_uppercase(),
                    f.finding_type,
                    f.file,
                    f.description
                );
            }
            text.push('\n');
        }
    }

    fn write_summaries<S: AsRef<str>>(&self, text: &mut String, files: &[S]) {
        let mut listed = HashSet::new();
        let summaries: Vec<_> = files
            .iter()
            .map(AsRef::as_ref)
            .filter(|path| listed.insert(*path))
            .filter_map(|path| self.latest_summary(path))
            .collect();
        if summaries.is_empty() {
            return;
        }

        text.push_str("### Known Files In This Pass\n\n");
        for summary in summaries {
            let _ = writeln!(
                text,
                "#### {} ({}, pass {})\n",
                summary.path, summary.file_type, summary.pass_number
            );
            let _ = writeln!(text, "{}", summary.description);
            if !summary.key_elements.is_empty() {
                let _ = writeln!(text, "Key elements: {}", summary.key_elements.join(", "));
            }
            text.push('\n');
        }
    }

    fn write_code_elements<S: AsRef<str>>(&self, text: &mut String, files: &[S]) {
        let mut elements: Vec<&CodeElement> = self
            .code_elements
            .iter()
            .filter(|e| files.iter().any(|f| f.as_ref() == e.file))
            .collect();
        if elements.is_empty() {
            return;
        }

        // Stable sort keeps insertion order between equally important elements
        elements.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        elements.truncate(MAX_PRIMER_CODE_ELEMENTS);

        text.push_str("### Key Code Elements\n\n");
        for e in elements {
            let _ = writeln!(text, "- {} `{}` in {}", e.element_type, e.name, e.file);
        }
        text.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::types::{CodeElementType, FileSummary, FindingSeverity};

    fn context_after_two_passes() -> ReviewContext {
        let mut ctx = ReviewContext::new("shop", "security", ["src/a.ts", "src/b.ts", "src/c.ts"]);
        ctx.start_pass();
        ctx.add_finding(Finding::new(
            "security",
            "Hardcoded secret",
            "src/a.ts",
            FindingSeverity::Critical,
        ));
        ctx.add_file_summary(
            FileSummary::new("src/b.ts", "service", "Payment gateway wrapper")
                .with_key_elements(["charge", "refund"]),
        );
        ctx.start_pass();
        ctx.add_finding(Finding::new(
            "performance",
            "N+1 query",
            "src/b.ts",
            FindingSeverity::Medium,
        ));
        ctx.add_code_element(CodeElement::new(CodeElementType::Function, "charge", "src/b.ts", 0.4));
        ctx.add_code_element(CodeElement::new(CodeElementType::Class, "Gateway", "src/b.ts", 0.9));
        ctx.add_code_element(CodeElement::new(CodeElementType::Function, "unused", "src/z.ts", 1.0));
        ctx.add_general_note("Payments go through Stripe");
        ctx
    }

    #[test]
    fn test_primer_labels_current_pass() {
        let ctx = context_after_two_passes();
        let text = ctx.generate_next_pass_context(&["src/c.ts"]);
        assert!(text.contains("## MULTI-PASS REVIEW CONTEXT"));
        assert!(text.contains("Current pass: 2."));
        assert!(text.contains("Project: shop (security review)"));
    }

    #[test]
    fn test_primer_includes_full_finding_history() {
        let ctx = context_after_two_passes();
        let text = ctx.generate_next_pass_context::<&str>(&[]);
        assert!(text.contains("#### Pass 1"));
        assert!(text.contains("#### Pass 2"));
        assert!(text.contains("[CRITICAL] security in src/a.ts: Hardcoded secret"));
        assert!(text.contains("[MEDIUM] performance in src/b.ts: N+1 query"));
        assert!(text.find("Pass 1").unwrap() < text.find("Pass 2").unwrap());
    }

    #[test]
    fn test_primer_summaries_only_for_requested_files() {
        let ctx = context_after_two_passes();

        let text = ctx.generate_next_pass_context(&["src/b.ts"]);
        assert!(text.contains("### Known Files In This Pass"));
        assert!(text.contains("Payment gateway wrapper"));
        assert!(text.contains("Key elements: charge, refund"));

        let text = ctx.generate_next_pass_context(&["src/c.ts"]);
        assert!(!text.contains("Known Files In This Pass"));
        assert!(!text.contains("Payment gateway wrapper"));
    }

    #[test]
    fn test_primer_code_elements_sorted_by_importance() {
        let ctx = context_after_two_passes();
        let text = ctx.generate_next_pass_context(&[String::from("src/b.ts")]);
        let gateway = text.find("class `Gateway`").unwrap();
        let charge = text.find("function `charge`").unwrap();
        assert!(gateway < charge);
        assert!(!text.contains("unused"));
    }

    #[test]
    fn test_primer_lists_repeated_file_once() {
        let ctx = context_after_two_passes();
        let text = ctx.generate_next_pass_context(&["src/b.ts", "src/b.ts", "src/b.ts"]);
        assert_eq!(text.matches("Payment gateway wrapper").count(), 1);
        assert_eq!(text.matches("class `Gateway`").count(), 1);
    }

    #[test]
    fn test_primer_includes_notes() {
        let ctx = context_after_two_passes();
        let text = ctx.generate_next_pass_context(&["src/c.ts"]);
        assert!(text.contains("### Notes"));
        assert!(text.contains("- Payments go through Stripe"));
    }

    #[test]
    fn test_primer_for_fresh_context() {
        let ctx = ReviewContext::new("", "", Vec::<String>::new());
        let text = ctx.generate_next_pass_context(&["src/a.ts"]);
        assert!(text.contains("Current pass: 0."));
        assert!(text.contains("No findings recorded yet."));
        assert!(!text.contains("Project:"));
        assert!(!text.contains("### Notes"));
    }

    #[test]
    fn test_primer_caps_code_elements() {
        let mut ctx = ReviewContext::new("p", "quick-fixes", ["src/big.ts"]);
        for i in 0..(MAX_PRIMER_CODE_ELEMENTS + 5) {
            ctx.add_code_element(CodeElement::new(
                CodeElementType::Function,
                format!("fn{}", i),
                "src/big.ts",
                i as f64,
            ));
        }
        let text = ctx.generate_next_pass_context(&["src/big.ts"]);
        let listed = text.lines().filter(|l| l.starts_with("- function")).count();
        assert_eq!(listed, MAX_PRIMER_CODE_ELEMENTS);
        assert!(text.contains("`fn24`"));
        assert!(!text.contains("`fn0`"));
    }
}
