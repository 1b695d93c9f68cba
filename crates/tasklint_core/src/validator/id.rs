//! Task ID format, uniqueness and parent linkage.
//!
//! # Responsibility
//! - Check main and subtask ID shapes.
//! - Report duplicate IDs and subtasks whose parent main task is missing.
//! - Warn on mixed prefixes and, when enabled, on semantic prefix hints.
//!
//! # Invariants
//! - Runs first; later validators assume IDs are well formed.
//! - Each subtask ID is checked exactly once: nested subtasks through their
//!   main task, top-level subtasks directly. Semantic hints follow suit.
//! - The mixed-prefix warning comes from the first task object only, so a
//!   repeated first ID does not repeat it.
//! - Prefix findings are warnings and never fail validation.

use super::{ValidationContext, Validator};
use crate::config::ValidationConfig;
use crate::model::result::{ErrorKind, ValidationError, ValidationResult};
use crate::model::task::Task;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static NUMBERED_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)-(\d+)$").expect("valid numbered suffix regex"));
static LETTER_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+\d)([a-z])$").expect("valid letter suffix regex"));
static PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2,4})").expect("valid prefix regex"));

/// Subtask flavour, derived from the ID suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtaskFormat {
    /// `PARENT-N`: full section set required.
    Numbered,
    /// `PARENTx`: lightweight checklist entry.
    Checkbox,
}

/// A subtask ID split into its parent ID and format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskId {
    pub parent_id: String,
    pub format: SubtaskFormat,
}

/// Splits a subtask ID, or `None` when it matches none of the subtask forms.
///
/// Numbered suffixes accept plain and dash-delimited parents; letter
/// suffixes only accept parents matching the configured ID pattern.
pub fn parse_subtask_id(id: &str, config: &ValidationConfig) -> Option<SubtaskId> {
    if let Some(caps) = NUMBERED_SUFFIX_RE.captures(id) {
        let parent = &caps[1];
        if config.is_valid_main_id(parent) {
            return Some(SubtaskId {
                parent_id: parent.to_string(),
                format: SubtaskFormat::Numbered,
            });
        }
    }
    if let Some(caps) = LETTER_SUFFIX_RE.captures(id) {
        let parent = &caps[1];
        if config.matches_id_pattern(parent) {
            return Some(SubtaskId {
                parent_id: parent.to_string(),
                format: SubtaskFormat::Checkbox,
            });
        }
    }
    None
}

/// Leading 2-4 uppercase letters of an ID.
pub fn id_prefix(id: &str) -> Option<&str> {
    PREFIX_RE
        .captures(id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub struct IdValidator;

impl Validator for IdValidator {
    fn name(&self) -> &'static str {
        "id"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        let mut findings = Vec::new();

        if task.is_main() {
            check_main_id(task, context, &mut findings);
            for subtask in &task.subtasks {
                check_subtask_id(subtask, context, &mut findings);
            }
        } else {
            check_subtask_id(task, context, &mut findings);
        }

        check_mixed_prefixes(task, context, &mut findings);
        if context.config.semantic_prefixes_enabled() {
            check_semantic_prefix(task, context, &mut findings);
            for subtask in &task.subtasks {
                check_semantic_prefix(subtask, context, &mut findings);
            }
        }

        ValidationResult::from_findings(findings)
    }
}

fn check_main_id(task: &Task, context: &ValidationContext<'_>, out: &mut Vec<ValidationError>) {
    if !context.config.is_valid_main_id(&task.id) {
        out.push(
            ValidationError::error(
                ErrorKind::InvalidIdFormat,
                &task.id,
                format!("invalid main task ID format: `{}`", task.id),
            )
            .with_context("id", task.id.as_str())
            .with_context("task_type", "main"),
        );
    }
    check_duplicate(task, context, out);
}

fn check_subtask_id(task: &Task, context: &ValidationContext<'_>, out: &mut Vec<ValidationError>) {
    match parse_subtask_id(&task.id, context.config) {
        None => out.push(
            ValidationError::error(
                ErrorKind::InvalidIdFormat,
                &task.id,
                format!(
                    "invalid subtask ID format: `{}` (expected PARENT-N or PARENTx)",
                    task.id
                ),
            )
            .with_context("id", task.id.as_str())
            .with_context("task_type", "subtask"),
        ),
        Some(parsed) => {
            let parent_exists = context
                .all_tasks
                .iter()
                .any(|candidate| candidate.is_main() && candidate.id == parsed.parent_id);
            if !parent_exists {
                out.push(
                    ValidationError::error(
                        ErrorKind::InvalidSubtaskId,
                        &task.id,
                        format!(
                            "subtask `{}` has no parent main task `{}`",
                            task.id, parsed.parent_id
                        ),
                    )
                    .with_context("parent_id", parsed.parent_id),
                );
            }
        }
    }
    check_duplicate(task, context, out);
}

fn check_duplicate(task: &Task, context: &ValidationContext<'_>, out: &mut Vec<ValidationError>) {
    let count = context.count_id(&task.id);
    if count > 1 {
        out.push(
            ValidationError::error(
                ErrorKind::DuplicateTaskId,
                &task.id,
                format!("task ID `{}` appears {count} times", task.id),
            )
            .with_context("count", count),
        );
    }
}

/// Emitted once per document, from the first task in document order.
fn check_mixed_prefixes(
    task: &Task,
    context: &ValidationContext<'_>,
    out: &mut Vec<ValidationError>,
) {
    let Some(first) = context.all_tasks.first() else {
        return;
    };
    if !std::ptr::eq(*first, task) {
        return;
    }

    let prefixes: BTreeSet<&str> = context
        .all_tasks
        .iter()
        .filter_map(|candidate| id_prefix(&candidate.id))
        .collect();
    if prefixes.len() > 1 {
        let listed: Vec<&str> = prefixes.into_iter().collect();
        out.push(
            ValidationError::warning(
                ErrorKind::MixedPrefixes,
                &task.id,
                format!("document mixes task ID prefixes: {}", listed.join(", ")),
            )
            .with_context("prefixes", listed),
        );
    }
}

fn check_semantic_prefix(
    task: &Task,
    context: &ValidationContext<'_>,
    out: &mut Vec<ValidationError>,
) {
    let Some(prefix) = id_prefix(&task.id) else {
        return;
    };
    let config = context.config;
    let actual = config.category_for_id(&task.id);

    match config.semantic_category(prefix) {
        Some(expected) if actual != Some(expected) => {
            let actual_name = actual.map(|c| c.as_str()).unwrap_or("none");
            out.push(
                ValidationError::warning(
                    ErrorKind::SemanticPrefixMismatch,
                    &task.id,
                    format!(
                        "prefix `{prefix}` suggests category `{expected}` but ID number maps to `{actual_name}`"
                    ),
                )
                .with_context("prefix", prefix)
                .with_context("expected_category", expected.as_str())
                .with_context("actual_category", actual_name),
            );
        }
        Some(_) => {}
        None => {
            let looks_semantic = prefix.len() >= 3
                || config
                    .known_semantic_prefixes()
                    .iter()
                    .any(|known| known == prefix);
            if looks_semantic {
                out.push(
                    ValidationError::warning(
                        ErrorKind::UnrecognizedSemanticPrefix,
                        &task.id,
                        format!("prefix `{prefix}` is not mapped to any category"),
                    )
                    .with_context("prefix", prefix),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_subtask_id, IdValidator, SubtaskFormat};
    use crate::config::{ValidationConfig, ValidationSettings};
    use crate::document::references::References;
    use crate::model::result::ErrorKind;
    use crate::model::task::Task;
    use crate::validator::fixtures::with_context;
    use crate::validator::Validator;

    fn run(tasks: &[Task], index: usize, config: &ValidationConfig) -> crate::ValidationResult {
        with_context(tasks, &References::new(), config, |ctx| {
            IdValidator.validate(&tasks[index], ctx)
        })
    }

    #[test]
    fn parses_three_subtask_forms() {
        let config = ValidationConfig::default();
        let numbered = parse_subtask_id("SSH0001-2", &config).expect("numbered form");
        assert_eq!(numbered.parent_id, "SSH0001");
        assert_eq!(numbered.format, SubtaskFormat::Numbered);

        let letter = parse_subtask_id("SSH0001a", &config).expect("letter form");
        assert_eq!(letter.parent_id, "SSH0001");
        assert_eq!(letter.format, SubtaskFormat::Checkbox);

        let dashed = parse_subtask_id("SSH-001-3", &config).expect("dash form");
        assert_eq!(dashed.parent_id, "SSH-001");

        assert!(parse_subtask_id("SSH0001", &config).is_none());
        assert!(parse_subtask_id("SSH0001-x", &config).is_none());
        assert!(parse_subtask_id("SSH0001AB", &config).is_none());
    }

    #[test]
    fn orphan_subtask_reports_exactly_one_invalid_subtask_id() {
        let tasks = vec![Task::subtask("SSH0001-1")];
        let result = run(&tasks, 0, &ValidationConfig::default());

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::InvalidSubtaskId);
        assert_eq!(result.errors[0].task_id, "SSH0001-1");
    }

    #[test]
    fn nested_subtask_with_wrong_parent_is_reported_once() {
        let tasks = vec![Task::main("SSH0001").with_subtasks(vec![
            Task::subtask("SSH0001-1"),
            Task::subtask("SSH0002-1"),
        ])];
        let result = run(&tasks, 0, &ValidationConfig::default());

        let orphans = result.findings_of(ErrorKind::InvalidSubtaskId);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].task_id, "SSH0002-1");
    }

    #[test]
    fn malformed_ids_are_invalid_format() {
        let tasks = vec![
            Task::main("ssh1"),
            Task::main("SSH0001").with_subtasks(vec![Task::subtask("SSH0001-one")]),
        ];
        let config = ValidationConfig::default();

        let first = run(&tasks, 0, &config);
        assert_eq!(first.errors[0].kind, ErrorKind::InvalidIdFormat);

        let second = run(&tasks, 1, &config);
        assert_eq!(second.errors.len(), 1);
        assert_eq!(second.errors[0].kind, ErrorKind::InvalidIdFormat);
        assert_eq!(second.errors[0].task_id, "SSH0001-one");
    }

    #[test]
    fn duplicate_ids_report_count() {
        let tasks = vec![Task::main("SSH0001"), Task::main("SSH0001")];
        let result = run(&tasks, 0, &ValidationConfig::default());

        let duplicates = result.findings_of(ErrorKind::DuplicateTaskId);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].context["count"], 2);
    }

    #[test]
    fn mixed_prefixes_is_a_single_document_warning() {
        let tasks = vec![Task::main("SSH0001"), Task::main("WEB0101")];
        let config = ValidationConfig::default();

        let first = run(&tasks, 0, &config);
        assert!(first.valid);
        assert_eq!(first.warnings.len(), 1);
        assert_eq!(first.warnings[0].kind, ErrorKind::MixedPrefixes);
        assert_eq!(first.warnings[0].context["prefixes"][1], "WEB");

        let second = run(&tasks, 1, &config);
        assert!(second.warnings.is_empty());
    }

    #[test]
    fn mixed_prefixes_warn_once_when_first_id_repeats() {
        let tasks = vec![
            Task::main("SSH0001"),
            Task::main("SSH0001"),
            Task::main("WEB0101"),
        ];
        let config = ValidationConfig::default();

        let warnings: usize = (0..tasks.len())
            .map(|index| run(&tasks, index, &config))
            .map(|result| result.findings_of(ErrorKind::MixedPrefixes).len())
            .sum();
        assert_eq!(warnings, 1);
        assert_eq!(
            run(&tasks, 0, &config)
                .findings_of(ErrorKind::MixedPrefixes)
                .len(),
            1
        );
    }

    #[test]
    fn semantic_prefix_hints_are_warnings_when_enabled() {
        let config = ValidationConfig::from_settings(ValidationSettings {
            enable_semantic_prefixes: true,
            ..ValidationSettings::default()
        })
        .expect("settings compile");
        let tasks = vec![
            Task::main("WEB0001"),
            Task::main("WEB0101"),
            Task::main("SSH0002"),
        ];

        let mismatch = run(&tasks, 0, &config);
        assert!(mismatch.valid);
        assert_eq!(
            mismatch.findings_of(ErrorKind::SemanticPrefixMismatch).len(),
            1
        );

        let matching = run(&tasks, 1, &config);
        assert!(matching
            .findings_of(ErrorKind::SemanticPrefixMismatch)
            .is_empty());

        let unmapped = run(&tasks, 2, &config);
        assert_eq!(
            unmapped
                .findings_of(ErrorKind::UnrecognizedSemanticPrefix)
                .len(),
            1
        );
    }

    #[test]
    fn semantic_hints_cover_nested_subtasks() {
        let config = ValidationConfig::from_settings(ValidationSettings {
            enable_semantic_prefixes: true,
            ..ValidationSettings::default()
        })
        .expect("settings compile");
        let tasks = vec![Task::main("WEB0001").with_subtasks(vec![
            Task::subtask("WEB0001-1"),
            Task::subtask("WEB0001a"),
        ])];

        let result = run(&tasks, 0, &config);
        let ids: Vec<&str> = result
            .findings_of(ErrorKind::SemanticPrefixMismatch)
            .iter()
            .map(|finding| finding.task_id.as_str())
            .collect();
        assert_eq!(ids, vec!["WEB0001", "WEB0001-1", "WEB0001a"]);
        assert!(result.valid);
    }

    #[test]
    fn semantic_hints_are_off_by_default() {
        let tasks = vec![Task::main("SSH0001")];
        let result = run(&tasks, 0, &ValidationConfig::default());
        assert!(result.warnings.is_empty());
        assert!(result.valid);
    }
}
