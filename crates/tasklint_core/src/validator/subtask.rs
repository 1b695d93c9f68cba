//! Per-subtask rules applied from the parent main task.
//!
//! # Responsibility
//! - Pick the rule set from the subtask ID shape (numbered vs checkbox).
//! - Check status, sections, review rating and prefix against the parent.
//!
//! # Invariants
//! - Checkbox subtasks impose no section requirement.
//! - Numbered subtasks meet the subtask section and error-handling rules;
//!   a missing `**Status**` is reported once, as missing_subtask_sections.
//! - IDs that match no subtask form are held to the numbered rules; the ID
//!   validator reports the malformed ID itself.

use super::error_handling::{check_error_handling, ErrorHandlingCheck, ERROR_HANDLING_SECTION};
use super::id::{parse_subtask_id, SubtaskFormat};
use super::section::SUBTASK_REQUIRED_SECTIONS;
use super::status::{check_review_rating, check_status, STATUS_COMPLETED};
use super::{missing_sections, section_present, ValidationContext, Validator};
use crate::model::result::{ErrorKind, ValidationError, ValidationResult};
use crate::model::task::Task;

const STATUS_SECTION: &str = "**Status**";

pub struct SubtaskValidator;

impl Validator for SubtaskValidator {
    fn name(&self) -> &'static str {
        "subtask"
    }

    fn priority(&self) -> i32 {
        45
    }

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        if !task.is_main() {
            return ValidationResult::success();
        }
        let results = task
            .subtasks
            .iter()
            .map(|subtask| validate_subtask(task, subtask, context));
        ValidationResult::combine(results)
    }
}

fn validate_subtask(
    parent: &Task,
    subtask: &Task,
    context: &ValidationContext<'_>,
) -> ValidationResult {
    let config = context.config;
    let format = parse_subtask_id(&subtask.id, config)
        .map(|parsed| parsed.format)
        .unwrap_or(SubtaskFormat::Numbered);
    let mut errors = Vec::new();

    if let Some(error) = check_status(subtask, config) {
        errors.push(error);
    }

    if format == SubtaskFormat::Numbered {
        let text = subtask.joined_content();
        let refs = context.references;

        let required: Vec<String> = missing_sections(&text, SUBTASK_REQUIRED_SECTIONS, refs)
            .into_iter()
            .filter(|marker| marker != STATUS_SECTION)
            .collect();
        if !required.is_empty() {
            errors.push(
                ValidationError::error(
                    ErrorKind::MissingRequiredSection,
                    &subtask.id,
                    format!("missing required sections: {}", required.join(", ")),
                )
                .with_context("missing_sections", required)
                .with_context("parent_id", parent.id.as_str()),
            );
        }

        let mut missing = Vec::new();
        if !section_present(&text, STATUS_SECTION, refs) {
            missing.push(STATUS_SECTION);
        }
        match check_error_handling(subtask, refs) {
            ErrorHandlingCheck::Complete => {}
            ErrorHandlingCheck::Absent => missing.push(ERROR_HANDLING_SECTION),
            ErrorHandlingCheck::Finding(error) => errors.push(error),
        }
        if !missing.is_empty() {
            errors.push(
                ValidationError::error(
                    ErrorKind::MissingSubtaskSections,
                    &subtask.id,
                    format!("numbered subtask is missing: {}", missing.join(", ")),
                )
                .with_context("missing_sections", missing)
                .with_context("parent_id", parent.id.as_str()),
            );
        }

        if subtask.status == STATUS_COMPLETED {
            if let Some(error) = check_review_rating(subtask, config) {
                errors.push(error);
            }
        }
    }

    let parent_prefix = leading_letters(&parent.id);
    let subtask_prefix = leading_letters(&subtask.id);
    if parent_prefix != subtask_prefix {
        errors.push(
            ValidationError::error(
                ErrorKind::InconsistentSubtaskPrefix,
                &subtask.id,
                format!(
                    "subtask prefix `{subtask_prefix}` does not match parent prefix `{parent_prefix}`"
                ),
            )
            .with_context("expected", parent_prefix)
            .with_context("actual", subtask_prefix)
            .with_context("parent_id", parent.id.as_str()),
        );
    }

    ValidationResult::failures(errors)
}

/// Letters before the first digit or dash.
fn leading_letters(id: &str) -> &str {
    let end = id
        .find(|c: char| c.is_ascii_digit() || c == '-')
        .unwrap_or(id.len());
    &id[..end]
}
