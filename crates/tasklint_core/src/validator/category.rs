//! Numeric-range categorization of main tasks.
//!
//! # Responsibility
//! - Map the numeric part of an ID onto the configured category ranges.
//! - Require the sections configured for the resulting category.
//!
//! # Invariants
//! - The category comes from the ID and range table only, never from
//!   a category already stored on the task.

use super::{missing_sections, ValidationContext, Validator};
use crate::model::result::{ErrorKind, ValidationError, ValidationResult};
use crate::model::task::Task;
use serde_json::{json, Value};

pub struct CategoryValidator;

impl Validator for CategoryValidator {
    fn name(&self) -> &'static str {
        "category"
    }

    fn priority(&self) -> i32 {
        35
    }

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        if !task.is_main() {
            return ValidationResult::success();
        }
        let config = context.config;

        let Some(number) = config.task_number(&task.id) else {
            return ValidationResult::failure(ValidationError::error(
                ErrorKind::InvalidIdForCategorization,
                &task.id,
                format!("cannot extract a task number from `{}`", task.id),
            ));
        };

        let Some(category) = config.category_for_number(number) else {
            let ranges: Value = config
                .category_ranges()
                .iter()
                .map(|(category, range)| {
                    (
                        category.as_str().to_string(),
                        json!({ "min": range.min, "max": range.max }),
                    )
                })
                .collect::<serde_json::Map<_, _>>()
                .into();
            return ValidationResult::failure(
                ValidationError::error(
                    ErrorKind::InvalidCategoryRange,
                    &task.id,
                    format!("task number {number} falls outside every category range"),
                )
                .with_context("task_number", number)
                .with_context("valid_ranges", ranges),
            );
        };

        let text = task.joined_content();
        let missing = missing_sections(
            &text,
            config.required_sections_for(category),
            context.references,
        );
        if missing.is_empty() {
            return ValidationResult::success();
        }
        ValidationResult::failure(
            ValidationError::error(
                ErrorKind::MissingCategorySections,
                &task.id,
                format!(
                    "{} task is missing sections: {}",
                    category.as_str(),
                    missing.join(", ")
                ),
            )
            .with_context("category", category.as_str())
            .with_context("missing_sections", missing),
        )
    }
}
