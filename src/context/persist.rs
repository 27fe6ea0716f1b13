//! JSON form of a review context.
//!
//! The top-level keys `currentPass`, `findings`, `codeElements`,
//! `fileSummaries` and `generalNotes` are a stable contract for callers that
//! persist a review and resume it later; all five are required on restore.
//! `projectName`, `reviewType`, `files`, `createdAt` and `updatedAt` are
//! written too but may be absent.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::review_context::ReviewContext;
use super::types::{CodeElement, FileSummary, Finding};
use crate::errors::{ContextDeserializationError, json_type_name};

const CURRENT_PASS: &str = "currentPass";
const FINDINGS: &str = "findings";
const CODE_ELEMENTS: &str = "codeElements";
const FILE_SUMMARIES: &str = "fileSummaries";
const GENERAL_NOTES: &str = "generalNotes";
const PROJECT_NAME: &str = "projectName";
const REVIEW_TYPE: &str = "reviewType";
const FILES: &str = "files";
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedContext<'a> {
    current_pass: u32,
    findings: &'a [Finding],
    code_elements: &'a [CodeElement],
    file_summaries: &'a [FileSummary],
    general_notes: &'a [String],
    project_name: &'a str,
    review_type: &'a str,
    files: &'a [String],
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReviewContext {
    fn persisted(&self) -> PersistedContext<'_> {
        PersistedContext {
            current_pass: self.current_pass,
            findings: &self.findings,
            code_elements: &self.code_elements,
            file_summaries: &self.file_summaries,
            general_notes: &self.general_notes,
            project_name: &self.project_name,
            review_type: &self.review_type,
            files: &self.files,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Serialize to the persisted JSON schema.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.persisted())
            .expect("review context holds only JSON-representable data")
    }

    /// Serialize to pretty-printed JSON text.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.persisted())
    }

    /// Restore a context from its persisted JSON form.
    ///
    /// Fails on anything that is not a complete, well-formed context; it never
    /// returns a partially populated or empty context for bad input.
    pub fn from_json(value: &Value) -> Result<Self, ContextDeserializationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ContextDeserializationError::NotAnObject {
                found: json_type_name(value),
            })?;

        let current_pass: u32 = required(obj, CURRENT_PASS)?;
        let findings: Vec<Finding> = required(obj, FINDINGS)?;
        let code_elements: Vec<CodeElement> = required(obj, CODE_ELEMENTS)?;
        let file_summaries: Vec<FileSummary> = required(obj, FILE_SUMMARIES)?;
        let general_notes: Vec<String> = required(obj, GENERAL_NOTES)?;

        if current_pass == u32::MAX {
            return Err(ContextDeserializationError::InvalidField {
                field: CURRENT_PASS,
                message: format!("{} leaves no room for another pass", current_pass),
            });
        }

        if let Some(f) = findings.iter().find(|f| f.pass_number > current_pass) {
            return Err(ContextDeserializationError::InvalidField {
                field: FINDINGS,
                message: format!(
                    "finding recorded in pass {} but current pass is {}",
                    f.pass_number, current_pass
                ),
            });
        }
        if let Some(s) = file_summaries.iter().find(|s| s.pass_number > current_pass) {
            return Err(ContextDeserializationError::InvalidField {
                field: FILE_SUMMARIES,
                message: format!(
                    "summary for {} recorded in pass {} but current pass is {}",
                    s.path, s.pass_number, current_pass
                ),
            });
        }

        let now = Utc::now();
        let created_at = optional(obj, CREATED_AT)?.unwrap_or(now);
        let updated_at = optional(obj, UPDATED_AT)?.unwrap_or(created_at);

        Ok(Self {
            project_name: optional(obj, PROJECT_NAME)?.unwrap_or_default(),
            review_type: optional(obj, REVIEW_TYPE)?.unwrap_or_default(),
            files: optional(obj, FILES)?.unwrap_or_default(),
            current_pass,
            code_elements,
            findings,
            file_summaries,
            general_notes,
            created_at,
            updated_at,
        })
    }

    /// Restore a context from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ContextDeserializationError> {
        let value: Value =
            serde_json::from_str(text).map_err(ContextDeserializationError::InvalidJson)?;
        Self::from_json(&value)
    }
}

fn required<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<T, ContextDeserializationError> {
    let value = obj
        .get(field)
        .ok_or(ContextDeserializationError::MissingField { field })?;
    decode(value, field)
}

fn optional<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<T>, ContextDeserializationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode(value, field).map(Some),
    }
}

fn decode<T: DeserializeOwned>(
    value: &Value,
    field: &'static str,
) -> Result<T, ContextDeserializationError> {
    T::deserialize(value).map_err(|e| ContextDeserializationError::InvalidField {
        field,
        message: e.to_string(),
    })
}
