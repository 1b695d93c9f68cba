//! Error-handling documentation rules.
//!
//! # Responsibility
//! - Require the error-handling section shape that matches the task type.
//! - Accept recognized reference placeholders instead of inline sections.
//!
//! # Invariants
//! - Completeness is exact-string containment of each required fragment.
//! - `**Error Handling Implementation**` is owned by the section validator.
//! - Nested numbered subtasks reuse `check_error_handling` via the subtask
//!   validator.

use super::{recognized_reference, ReferenceUse, ValidationContext, Validator};
use crate::document::references::References;
use crate::model::result::{ErrorKind, ValidationError, ValidationResult};
use crate::model::task::Task;

pub const ERROR_HANDLING_SECTION: &str = "**Error Handling**";

/// Required fragments of a main task's error-handling section.
pub const MAIN_ERROR_HANDLING_FRAGMENTS: &[&str] = &[
    "**Core Principles**",
    "- Pass raw errors",
    "- Use {:ok, result} | {:error, reason}",
    "- Let it crash",
    "**Error Implementation**",
    "- No wrapping",
    "- Minimal rescue",
    "- function/1 & /2 patterns",
    "**Error Examples**",
    "- Raw error passthrough",
    "- Simple rescue case",
    "- Supervisor handling",
    "**GenServer Specifics**",
    "- Handle_call/3 error pattern",
    "- Terminate/2 proper usage",
    "- Process linking considerations",
];

/// Required fragments of a subtask's error-handling section.
pub const SUBTASK_ERROR_HANDLING_FRAGMENTS: &[&str] = &[
    "**Task-Specific Approach**",
    "- Error pattern for this task",
    "**Error Reporting**",
    "- Monitoring approach",
];

pub const MAIN_ERROR_HANDLING_REFERENCES: &[&str] =
    &["error-handling", "error-handling-main", "def-error-handling"];
pub const SUBTASK_ERROR_HANDLING_REFERENCES: &[&str] =
    &["error-handling-subtask", "subtask-error-handling"];

pub struct ErrorHandlingValidator;

impl Validator for ErrorHandlingValidator {
    fn name(&self) -> &'static str {
        "error_handling"
    }

    fn priority(&self) -> i32 {
        55
    }

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        match check_error_handling(task, context.references) {
            ErrorHandlingCheck::Complete => ValidationResult::success(),
            ErrorHandlingCheck::Finding(error) => ValidationResult::failure(error),
            ErrorHandlingCheck::Absent => {
                let (_, reference_names, label) = shape_for(task);
                ValidationResult::failure(
                    ValidationError::error(
                        ErrorKind::MissingErrorHandling,
                        &task.id,
                        format!(
                            "missing {ERROR_HANDLING_SECTION} section or one of: {}",
                            placeholder_list(reference_names)
                        ),
                    )
                    .with_context("accepted_references", reference_names.to_vec())
                    .with_context("task_type", label),
                )
            }
        }
    }
}

/// Outcome of checking one task's error-handling documentation.
#[derive(Debug)]
pub(crate) enum ErrorHandlingCheck {
    Complete,
    /// Neither the section nor a recognized placeholder is present.
    Absent,
    Finding(ValidationError),
}

fn shape_for(task: &Task) -> (&'static [&'static str], &'static [&'static str], &'static str) {
    if task.is_main() {
        (
            MAIN_ERROR_HANDLING_FRAGMENTS,
            MAIN_ERROR_HANDLING_REFERENCES,
            "main",
        )
    } else {
        (
            SUBTASK_ERROR_HANDLING_FRAGMENTS,
            SUBTASK_ERROR_HANDLING_REFERENCES,
            "subtask",
        )
    }
}

/// Checks the section shape for the task's type, nested subtasks included.
pub(crate) fn check_error_handling(task: &Task, references: &References) -> ErrorHandlingCheck {
    let (fragments, reference_names, label) = shape_for(task);
    let text = task.joined_content();

    if text.contains(ERROR_HANDLING_SECTION) {
        let missing: Vec<&str> = fragments
            .iter()
            .copied()
            .filter(|fragment| !text.contains(fragment))
            .collect();
        if missing.is_empty() {
            return ErrorHandlingCheck::Complete;
        }
        return ErrorHandlingCheck::Finding(
            ValidationError::error(
                ErrorKind::IncompleteErrorHandling,
                &task.id,
                format!(
                    "{label} error handling section is missing: {}",
                    missing.join(", ")
                ),
            )
            .with_context("missing_fragments", missing)
            .with_context("task_type", label),
        );
    }

    match recognized_reference(&text, reference_names, references) {
        ReferenceUse::Resolved(_) => ErrorHandlingCheck::Complete,
        ReferenceUse::Missing(name) => ErrorHandlingCheck::Finding(
            ValidationError::error(
                ErrorKind::MissingErrorHandling,
                &task.id,
                format!("error handling reference `{{{{{name}}}}}` is not defined"),
            )
            .with_context("reference", name),
        ),
        ReferenceUse::NotUsed => ErrorHandlingCheck::Absent,
    }
}

fn placeholder_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("{{{{{name}}}}}"))
        .collect::<Vec<_>>()
        .join(", ")
}
