//! Validator contract and the built-in rule set.
//!
//! # Responsibility
//! - Define the `Validator` trait every rule module implements.
//! - Define the read-only context shared by all validators of one run.
//! - Provide marker lookup that honors one level of `{{name}}` references.
//!
//! # Invariants
//! - Validators are pure functions of `(task, context)`.
//! - Higher `priority()` runs first; the default is 50.
//! - Section detection is substring search over joined content, never a
//!   Markdown structure match.

pub mod category;
pub mod dependency;
pub mod error_handling;
pub mod id;
pub mod kpi;
pub mod section;
pub mod status;
pub mod subtask;

pub use category::CategoryValidator;
pub use dependency::DependencyValidator;
pub use error_handling::ErrorHandlingValidator;
pub use id::IdValidator;
pub use kpi::KpiValidator;
pub use section::SectionValidator;
pub use status::StatusValidator;
pub use subtask::SubtaskValidator;

use crate::config::ValidationConfig;
use crate::document::references::{placeholders_in, uses_placeholder, References};
use crate::model::result::ValidationResult;
use crate::model::task::Task;

/// Priority used when a validator does not override `priority()`.
pub const DEFAULT_PRIORITY: i32 = 50;

/// One independent rule module.
pub trait Validator: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult;

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }
}

/// Document-wide inputs shared by every validator call of one run.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub config: &'a ValidationConfig,
    /// Every task in the document, mains followed by their subtasks.
    pub all_tasks: &'a [&'a Task],
    pub references: &'a References,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        config: &'a ValidationConfig,
        all_tasks: &'a [&'a Task],
        references: &'a References,
    ) -> Self {
        Self {
            config,
            all_tasks,
            references,
        }
    }

    pub fn find_task(&self, id: &str) -> Option<&'a Task> {
        self.all_tasks.iter().copied().find(|task| task.id == id)
    }

    pub fn count_id(&self, id: &str) -> usize {
        self.all_tasks.iter().filter(|task| task.id == id).count()
    }
}

/// The eight built-in validators, unsorted.
pub fn standard_validators() -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(IdValidator),
        Box::new(StatusValidator),
        Box::new(SectionValidator),
        Box::new(ErrorHandlingValidator),
        Box::new(SubtaskValidator),
        Box::new(DependencyValidator),
        Box::new(KpiValidator),
        Box::new(CategoryValidator),
    ]
}

/// Outcome of looking for one of several recognized placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReferenceUse {
    NotUsed,
    Resolved(String),
    Missing(String),
}

/// First recognized placeholder in `text`, resolved against `references`.
///
/// A resolvable placeholder wins over an unresolvable one.
pub(crate) fn recognized_reference(
    text: &str,
    names: &[&str],
    references: &References,
) -> ReferenceUse {
    let used: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| uses_placeholder(text, name))
        .collect();
    if let Some(name) = used.iter().find(|name| references.contains(name)) {
        return ReferenceUse::Resolved(name.to_string());
    }
    match used.first() {
        Some(name) => ReferenceUse::Missing(name.to_string()),
        None => ReferenceUse::NotUsed,
    }
}

/// Whether `marker` appears in `text` or in any block referenced from it.
pub(crate) fn section_present(text: &str, marker: &str, references: &References) -> bool {
    if text.contains(marker) {
        return true;
    }
    placeholders_in(text).iter().any(|name| {
        references
            .resolve(name)
            .is_some_and(|lines| lines.iter().any(|line| line.contains(marker)))
    })
}

/// Markers from `required` that `section_present` cannot find, in order.
pub(crate) fn missing_sections<S: AsRef<str>>(
    text: &str,
    required: &[S],
    references: &References,
) -> Vec<String> {
    required
        .iter()
        .map(|marker| marker.as_ref())
        .filter(|marker| !section_present(text, marker, references))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared builders for validator unit tests.

    use super::ValidationContext;
    use crate::config::ValidationConfig;
    use crate::document::references::References;
    use crate::model::task::Task;

    pub fn with_context<R>(
        tasks: &[Task],
        references: &References,
        config: &ValidationConfig,
        run: impl FnOnce(&ValidationContext<'_>) -> R,
    ) -> R {
        let mut flat: Vec<&Task> = Vec::new();
        for task in tasks {
            flat.push(task);
            flat.extend(task.subtasks.iter());
        }
        let context = ValidationContext::new(config, &flat, references);
        run(&context)
    }
}
