//! Validation pipeline over a whole task list.
//!
//! # Responsibility
//! - Order validators by priority and run every one against every task.
//! - Fold per-validator and per-task results into one document result.
//!
//! # Invariants
//! - No short-circuiting: a failing validator never stops the rest.
//! - Ties in priority keep registration order.
//! - Nested subtasks are reached through their main task, never visited
//!   as top-level tasks.

use crate::config::ValidationConfig;
use crate::document::parse_document;
use crate::document::references::References;
use crate::model::result::ValidationResult;
use crate::model::task::{Task, TaskList};
use crate::validator::{standard_validators, ValidationContext, Validator};
use log::{debug, info};

/// Ordered validator set applied to each top-level task.
pub struct ValidationPipeline {
    validators: Vec<Box<dyn Validator>>,
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl ValidationPipeline {
    /// Pipeline with the eight built-in validators.
    pub fn standard() -> Self {
        Self::with_validators(standard_validators())
    }

    pub fn with_validators(mut validators: Vec<Box<dyn Validator>>) -> Self {
        // Stable: equal priorities keep registration order.
        validators.sort_by_key(|validator| std::cmp::Reverse(validator.priority()));
        Self { validators }
    }

    /// Validator names in execution order.
    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub fn validate_task(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        let result = ValidationResult::combine(
            self.validators
                .iter()
                .map(|validator| validator.validate(task, context)),
        );
        debug!(
            "event=task_validated module=pipeline status={} task_id={} errors={} warnings={}",
            if result.valid { "ok" } else { "invalid" },
            task.id,
            result.error_count(),
            result.warning_count()
        );
        result
    }

    pub fn validate_task_list(
        &self,
        tasks: &TaskList,
        config: &ValidationConfig,
        references: &References,
    ) -> ValidationResult {
        let all_tasks = tasks.flatten();
        let context = ValidationContext::new(config, &all_tasks, references);
        let result = ValidationResult::combine(
            tasks
                .tasks
                .iter()
                .map(|task| self.validate_task(task, &context)),
        );
        info!(
            "event=document_validated module=pipeline status={} tasks={} errors={} warnings={}",
            if result.valid { "ok" } else { "invalid" },
            all_tasks.len(),
            result.error_count(),
            result.warning_count()
        );
        result
    }
}

/// Runs the standard pipeline over an already parsed task list.
pub fn validate_task_list(
    tasks: &TaskList,
    config: &ValidationConfig,
    references: &References,
) -> ValidationResult {
    ValidationPipeline::standard().validate_task_list(tasks, config, references)
}

/// Parses `text` and validates it with the standard pipeline.
pub fn validate_markdown(text: &str, config: &ValidationConfig) -> ValidationResult {
    let document = parse_document(text, config);
    validate_task_list(&document.tasks, config, &document.references)
}
