//! Validation results produced by a single validator model and by the
//! [`crate::ports::ValidationEnsemble`] consensus over several
//! (§4.4).

use serde::{Deserialize, Serialize};

/// Severity of a reported [`Issue`] (§6, `Validator.validate`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Low priority.
    Low,
    /// Should be fixed.
    Medium,
    /// Should block acceptance in most cases.
    High,
    /// Always blocks acceptance (§4.4 "no issue has severity =
    /// Critical").
    Critical,
}

/// A single defect reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// How severe this issue is.
    pub severity: Severity,
    /// Short machine-friendly category, e.g. `"compile_error"`, `"null_check"`.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
    /// File the issue was found in, if applicable.
    pub file_path: Option<String>,
    /// Line number the issue was found at, if applicable.
    pub line_number: Option<u32>,
    /// How many ensemble members independently reported this (post-merge).
    pub agreement_count: u32,
}

impl Issue {
    /// Construct a fresh, single-source issue (`agreement_count = 1`).
    #[must_use]
    pub fn new(severity: Severity, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind: kind.into(),
            message: message.into(),
            file_path: None,
            line_number: None,
            agreement_count: 1,
        }
    }

    /// Attach a location to this issue.
    #[must_use]
    pub fn at(mut self, file_path: impl Into<String>, line_number: u32) -> Self {
        self.file_path = Some(file_path.into());
        self.line_number = Some(line_number);
        self
    }

    /// Two issues are "the same" for merge purposes if their normalized
    /// `(filePath, lineNumber±2, kind)` match (§4.4 issue merging).
    #[must_use]
    pub fn matches_for_merge(&self, other: &Self) -> bool {
        if self.kind != other.kind || self.file_path != other.file_path {
            return false;
        }
        match (self.line_number, other.line_number) {
            (Some(a), Some(b)) => a.abs_diff(b) <= 2,
            (None, None) => true,
            _ => false,
        }
    }
}

/// Result of a single validator model's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerModelValidation {
    /// The validator model's name.
    pub model: String,
    /// That model's raw score (0-10).
    pub score: u8,
    /// Issues that model reported.
    pub issues: Vec<Issue>,
    /// How long that model's run took.
    pub duration_ms: u64,
}

/// The merged outcome of running a [`crate::ports::ValidationEnsemble`]
/// over one candidate (§3 "Attempt.validation").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Weighted-average score, 0-10.
    pub score: u8,
    /// `score >= minScore AND no Critical issue`.
    pub passed: bool,
    /// Deduplicated, merged issue list.
    pub issues: Vec<Issue>,
    /// Names of the models that contributed to this result.
    pub models_used: Vec<String>,
    /// Agreement-derived confidence in `[0, 1]`.
    pub confidence: f64,
    /// Raw per-model results, preserved for observability.
    pub per_model: Vec<PerModelValidation>,
}

impl ValidationResult {
    /// Whether any issue in this result is [`Severity::Critical`].
    #[must_use]
    pub fn has_critical_issue(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }
}
