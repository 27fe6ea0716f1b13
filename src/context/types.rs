//! Knowledge items accumulated across review passes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of structural element discovered in the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeElementType {
    Function,
    Class,
    Method,
    Interface,
    Type,
    Variable,
    Import,
    Component,
    Module,
    Other,
}

impl fmt::Display for CodeElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Method => "method",
            Self::Interface => "interface",
            Self::Type => "type",
            Self::Variable => "variable",
            Self::Import => "import",
            Self::Component => "component",
            Self::Module => "module",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A structural fact about the codebase. Pass-independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeElement {
    #[serde(rename = "type")]
    pub element_type: CodeElementType,
    pub name: String,
    pub file: String,
    /// Relative importance; higher is more important.
    pub importance: f64,
}

impl CodeElement {
    pub fn new(
        element_type: CodeElementType,
        name: impl Into<String>,
        file: impl Into<String>,
        importance: f64,
    ) -> Self {
        Self {
            element_type,
            name: name.into(),
            file: file.into(),
            importance,
        }
    }
}

/// Severity of a review finding, most severe first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Critical,
    #[serde(alias = "error")]
    High,
    #[default]
    #[serde(alias = "warning")]
    Medium,
    Low,
    Info,
}

impl FindingSeverity {
    /// Whether this finding should be fixed before merging.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Critical | Self::High | Self::Medium)
    }
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        };
        write!(f, "{}", s)
    }
}

/// An issue identified during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Category of the finding (e.g. "security", "performance").
    #[serde(rename = "type")]
    pub finding_type: String,
    pub description: String,
    pub file: String,
    pub severity: FindingSeverity,
    /// Pass the finding was recorded in. Overwritten on insertion.
    #[serde(default)]
    pub pass_number: u32,
}

impl Finding {
    pub fn new(
        finding_type: impl Into<String>,
        description: impl Into<String>,
        file: impl Into<String>,
        severity: FindingSeverity,
    ) -> Self {
        Self {
            finding_type: finding_type.into(),
            description: description.into(),
            file: file.into(),
            severity,
            pass_number: 0,
        }
    }
}

/// What a pass learned about one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub path: String,
    /// Role of the file (e.g. "component", "config", "test").
    #[serde(rename = "type")]
    pub file_type: String,
    pub description: String,
    #[serde(default)]
    pub key_elements: Vec<String>,
    /// Pass the summary was recorded in. Overwritten on insertion.
    #[serde(default)]
    pub pass_number: u32,
}

impl FileSummary {
    pub fn new(
        path: impl Into<String>,
        file_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            file_type: file_type.into(),
            description: description.into(),
            key_elements: Vec::new(),
            pass_number: 0,
        }
    }

    pub fn with_key_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_elements = elements.into_iter().map(Into::into).collect();
        self
    }
}
