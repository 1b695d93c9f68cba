//! Validation findings and their aggregation.
//!
//! # Responsibility
//! - Represent rule violations as values, never as control flow.
//! - Fold many partial results into one report.
//!
//! # Invariants
//! - `valid == errors.is_empty()` for every result built through this API.
//! - Warnings never change validity.
//! - `combine` preserves input order and is associative.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Diagnostic payload attached to a finding.
pub type ErrorContext = BTreeMap<String, Value>;

/// Flat namespace of finding tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidIdFormat,
    DuplicateTaskId,
    InvalidSubtaskId,
    MixedPrefixes,
    SemanticPrefixMismatch,
    UnrecognizedSemanticPrefix,
    InvalidStatus,
    InvalidPriority,
    MissingSubtasksForInProgress,
    MissingReviewRating,
    InvalidReviewRating,
    MissingRequiredSection,
    IncompleteCompletedTask,
    MissingErrorHandling,
    IncompleteErrorHandling,
    MissingSubtaskSections,
    InconsistentSubtaskPrefix,
    MissingDependenciesSection,
    InvalidDependencyReference,
    CircularDependency,
    MissingKpiSection,
    MissingKpiMetrics,
    InvalidKpiValue,
    InvalidCategoryRange,
    InvalidIdForCategorization,
    MissingCategorySections,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidIdFormat => "invalid_id_format",
            Self::DuplicateTaskId => "duplicate_task_id",
            Self::InvalidSubtaskId => "invalid_subtask_id",
            Self::MixedPrefixes => "mixed_prefixes",
            Self::SemanticPrefixMismatch => "semantic_prefix_mismatch",
            Self::UnrecognizedSemanticPrefix => "unrecognized_semantic_prefix",
            Self::InvalidStatus => "invalid_status",
            Self::InvalidPriority => "invalid_priority",
            Self::MissingSubtasksForInProgress => "missing_subtasks_for_in_progress",
            Self::MissingReviewRating => "missing_review_rating",
            Self::InvalidReviewRating => "invalid_review_rating",
            Self::MissingRequiredSection => "missing_required_section",
            Self::IncompleteCompletedTask => "incomplete_completed_task",
            Self::MissingErrorHandling => "missing_error_handling",
            Self::IncompleteErrorHandling => "incomplete_error_handling",
            Self::MissingSubtaskSections => "missing_subtask_sections",
            Self::InconsistentSubtaskPrefix => "inconsistent_subtask_prefix",
            Self::MissingDependenciesSection => "missing_dependencies_section",
            Self::InvalidDependencyReference => "invalid_dependency_reference",
            Self::CircularDependency => "circular_dependency",
            Self::MissingKpiSection => "missing_kpi_section",
            Self::MissingKpiMetrics => "missing_kpi_metrics",
            Self::InvalidKpiValue => "invalid_kpi_value",
            Self::InvalidCategoryRange => "invalid_category_range",
            Self::InvalidIdForCategorization => "invalid_id_for_categorization",
            Self::MissingCategorySections => "missing_category_sections",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding produced by a validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub task_id: String,
    pub severity: Severity,
    pub context: ErrorContext,
}

impl ValidationError {
    pub fn error(kind: ErrorKind, task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            task_id: task_id.into(),
            severity: Severity::Error,
            context: ErrorContext::new(),
        }
    }

    pub fn warning(kind: ErrorKind, task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, task_id, message)
        }
    }

    /// Adds one context entry. Used while building, before the value is shared.
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.task_id, self.message)
    }
}

/// Outcome of one validator call, one task, or a whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn success_with_warnings(warnings: Vec<ValidationError>) -> Self {
        Self {
            warnings,
            ..Self::success()
        }
    }

    pub fn failure(error: ValidationError) -> Self {
        Self::failures(vec![error])
    }

    /// Builds a result from a list of errors; an empty list is a success.
    pub fn failures(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }

    /// Builds a result from mixed findings, partitioned by severity.
    pub fn from_findings(findings: Vec<ValidationError>) -> Self {
        let (warnings, errors): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(ValidationError::is_warning);
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Concatenates all findings in input order.
    pub fn combine<I>(results: I) -> Self
    where
        I: IntoIterator<Item = ValidationResult>,
    {
        let mut combined = Self::success();
        for result in results {
            combined.merge(result);
        }
        combined
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.valid = self.errors.is_empty();
    }

    pub fn push_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.valid = false;
    }

    pub fn push_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Errors and warnings matching `kind`, errors first.
    pub fn findings_of(&self, kind: ErrorKind) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(|finding| finding.kind == kind)
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}
