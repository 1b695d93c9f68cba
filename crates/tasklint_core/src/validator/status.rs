//! Status and priority enumeration rules.

use super::{ValidationContext, Validator};
use crate::config::ValidationConfig;
use crate::model::result::{ErrorKind, ValidationError, ValidationResult};
use crate::model::task::Task;

pub const STATUS_IN_PROGRESS: &str = "In Progress";
pub const STATUS_COMPLETED: &str = "Completed";

pub struct StatusValidator;

impl Validator for StatusValidator {
    fn name(&self) -> &'static str {
        "status"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        let config = context.config;
        let mut errors = Vec::new();

        if let Some(error) = check_status(task, config) {
            errors.push(error);
        }

        // Subtasks may omit priority; only a present value must be valid.
        let priority_required = task.is_main() || !task.priority.is_empty();
        if priority_required && !config.is_valid_priority(&task.priority) {
            errors.push(
                ValidationError::error(
                    ErrorKind::InvalidPriority,
                    &task.id,
                    format!(
                        "invalid priority `{}`, expected one of: {}",
                        task.priority,
                        config.valid_priorities().join(", ")
                    ),
                )
                .with_context("actual", task.priority.as_str())
                .with_context("expected", config.valid_priorities().to_vec()),
            );
        }

        if task.is_main() && task.status == STATUS_IN_PROGRESS && task.subtasks.is_empty() {
            errors.push(ValidationError::error(
                ErrorKind::MissingSubtasksForInProgress,
                &task.id,
                "tasks in progress must be broken down into subtasks",
            ));
        }

        if task.is_subtask() && task.status == STATUS_COMPLETED {
            if let Some(error) = check_review_rating(task, config) {
                errors.push(error);
            }
        }

        ValidationResult::failures(errors)
    }
}

/// Status membership check shared with the subtask validator.
pub(crate) fn check_status(task: &Task, config: &ValidationConfig) -> Option<ValidationError> {
    if config.is_valid_status(&task.status) {
        return None;
    }
    Some(
        ValidationError::error(
            ErrorKind::InvalidStatus,
            &task.id,
            format!(
                "invalid status `{}`, expected one of: {}",
                task.status,
                config.valid_statuses().join(", ")
            ),
        )
        .with_context("actual", task.status.as_str())
        .with_context("expected", config.valid_statuses().to_vec()),
    )
}

/// Review rating presence and format for a completed subtask.
pub(crate) fn check_review_rating(
    task: &Task,
    config: &ValidationConfig,
) -> Option<ValidationError> {
    match task.review_rating.as_deref().map(str::trim) {
        None | Some("") => Some(ValidationError::error(
            ErrorKind::MissingReviewRating,
            &task.id,
            "completed subtasks must carry a review rating",
        )),
        Some(rating) if !config.is_valid_rating(rating) => Some(
            ValidationError::error(
                ErrorKind::InvalidReviewRating,
                &task.id,
                format!("review rating `{rating}` must be N.N between 1.0 and 5.0, optionally `(partial)`"),
            )
            .with_context("actual", rating),
        ),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::StatusValidator;
    use crate::config::ValidationConfig;
    use crate::document::references::References;
    use crate::model::result::{ErrorKind, ValidationResult};
    use crate::model::task::Task;
    use crate::validator::fixtures::with_context;
    use crate::validator::Validator;

    fn run(task: Task) -> ValidationResult {
        let tasks = vec![task];
        with_context(&tasks, &References::new(), &ValidationConfig::default(), |ctx| {
            StatusValidator.validate(&tasks[0], ctx)
        })
    }

    #[test]
    fn in_progress_main_without_subtasks_fails_once() {
        let result = run(Task::main("SSH0001")
            .with_status("In Progress")
            .with_priority("High"));

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::MissingSubtasksForInProgress);
    }

    #[test]
    fn in_progress_main_with_subtasks_passes() {
        let result = run(Task::main("SSH0001")
            .with_status("In Progress")
            .with_priority("High")
            .with_subtasks(vec![Task::subtask("SSH0001-1").with_status("Planned")]));
        assert!(result.valid);
    }

    #[test]
    fn unknown_status_and_priority_are_both_reported() {
        let result = run(Task::main("SSH0001").with_status("Doing").with_priority("Urgent"));

        let kinds: Vec<ErrorKind> = result.errors.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::InvalidStatus, ErrorKind::InvalidPriority]);
        assert_eq!(result.errors[0].context["actual"], "Doing");
    }

    #[test]
    fn status_match_is_case_sensitive() {
        let result = run(Task::main("SSH0001").with_status("planned").with_priority("Low"));
        assert_eq!(result.errors[0].kind, ErrorKind::InvalidStatus);
    }

    #[test]
    fn completed_subtask_needs_valid_rating() {
        let missing = run(Task::subtask("SSH0001-1").with_status("Completed"));
        assert_eq!(missing.errors[0].kind, ErrorKind::MissingReviewRating);

        let invalid = run(Task::subtask("SSH0001-1")
            .with_status("Completed")
            .with_review_rating("7"));
        assert_eq!(invalid.errors[0].kind, ErrorKind::InvalidReviewRating);

        let partial = run(Task::subtask("SSH0001-1")
            .with_status("Completed")
            .with_review_rating("3.5 (partial)"));
        assert!(partial.valid);
    }

    #[test]
    fn subtask_without_priority_is_fine() {
        let result = run(Task::subtask("SSH0001-1").with_status("Planned"));
        assert!(result.valid);
    }
}
