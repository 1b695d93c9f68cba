//! Required content sections per task type and status.

use super::status::STATUS_COMPLETED;
use super::{missing_sections, ValidationContext, Validator};
use crate::model::result::{ErrorKind, ValidationError, ValidationResult};
use crate::model::task::Task;

pub const MAIN_REQUIRED_SECTIONS: &[&str] = &["**Description**", "**Status**", "**Priority**"];
pub const SUBTASK_REQUIRED_SECTIONS: &[&str] = &["**Description**", "**Status**"];
pub const COMPLETED_TASK_SECTIONS: &[&str] = &[
    "**Implementation Notes**",
    "**Complexity Assessment**",
    "**Maintenance Impact**",
    "**Error Handling Implementation**",
];

pub struct SectionValidator;

impl Validator for SectionValidator {
    fn name(&self) -> &'static str {
        "section"
    }

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        let text = task.joined_content();
        let mut errors = Vec::new();

        let required = if task.is_main() {
            MAIN_REQUIRED_SECTIONS
        } else {
            SUBTASK_REQUIRED_SECTIONS
        };
        let missing = missing_sections(&text, required, context.references);
        if !missing.is_empty() {
            errors.push(
                ValidationError::error(
                    ErrorKind::MissingRequiredSection,
                    &task.id,
                    format!("missing required sections: {}", missing.join(", ")),
                )
                .with_context("missing_sections", missing),
            );
        }

        if task.is_main() && task.status == STATUS_COMPLETED {
            let missing = missing_sections(&text, COMPLETED_TASK_SECTIONS, context.references);
            if !missing.is_empty() {
                errors.push(
                    ValidationError::error(
                        ErrorKind::IncompleteCompletedTask,
                        &task.id,
                        format!(
                            "completed task is missing sections: {}",
                            missing.join(", ")
                        ),
                    )
                    .with_context("missing_sections", missing),
                );
            }
        }

        ValidationResult::failures(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::SectionValidator;
    use crate::config::ValidationConfig;
    use crate::document::references::References;
    use crate::model::result::{ErrorKind, ValidationResult};
    use crate::model::task::Task;
    use crate::validator::fixtures::with_context;
    use crate::validator::Validator;

    fn run(task: Task, references: &References) -> ValidationResult {
        let tasks = vec![task];
        with_context(&tasks, references, &ValidationConfig::default(), |ctx| {
            SectionValidator.validate(&tasks[0], ctx)
        })
    }

    #[test]
    fn lists_every_missing_main_section() {
        let result = run(
            Task::main("SSH0001").with_content(["**Status**: Planned"]),
            &References::new(),
        );

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::MissingRequiredSection);
        assert_eq!(
            result.errors[0].context["missing_sections"],
            serde_json::json!(["**Description**", "**Priority**"])
        );
    }

    #[test]
    fn subtask_does_not_need_priority() {
        let result = run(
            Task::subtask("SSH0001-1").with_content(["**Description**", "**Status**: Planned"]),
            &References::new(),
        );
        assert!(result.valid);
    }

    #[test]
    fn completed_main_requires_closing_sections() {
        let result = run(
            Task::main("SSH0001")
                .with_status("Completed")
                .with_content([
                    "**Description**",
                    "**Status**: Completed",
                    "**Priority**: High",
                    "**Implementation Notes**",
                ]),
            &References::new(),
        );

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::IncompleteCompletedTask);
        assert_eq!(
            result.errors[0].context["missing_sections"]
                .as_array()
                .map(Vec::len),
            Some(3)
        );
    }

    #[test]
    fn sections_may_come_from_a_reference() {
        let refs = References::new().with(
            "task-header",
            ["**Description**", "**Status**", "**Priority**"],
        );
        let result = run(Task::main("SSH0001").with_content(["{{task-header}}"]), &refs);
        assert!(result.valid);
    }

    #[test]
    fn markers_are_found_inside_arbitrary_markup() {
        let result = run(
            Task::main("SSH0001").with_content([
                "| **Description** | cell |",
                "  > **Status**: Planned",
                "- nested - **Priority**: Low",
            ]),
            &References::new(),
        );
        assert!(result.valid);
    }
}
