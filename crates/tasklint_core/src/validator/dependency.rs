//! Dependency declaration, existence and cycle rules.
//!
//! # Responsibility
//! - Require a `**Dependencies**` section or a no-dependencies reference.
//! - Resolve declared IDs against every task and subtask in the document.
//! - Detect direct (self) and transitive cycles through the validated task.
//!
//! # Invariants
//! - Tasks without parseable dependency data are leaves of the walk.
//! - Each node is expanded at most once per validated task.
//! - Unknown IDs are reported in one finding, never per traversal step.

use super::{ValidationContext, Validator};
use crate::document::references::uses_placeholder;
use crate::model::result::{ErrorKind, ValidationError, ValidationResult};
use crate::model::task::Task;
use std::collections::{BTreeMap, BTreeSet};

pub const DEPENDENCIES_SECTION: &str = "**Dependencies**";
pub const NO_DEPENDENCY_REFERENCES: &[&str] = &["def-no-dependencies", "no-dependencies"];

/// Declared dependency IDs, or `None` when the task declares nothing.
///
/// Reads the text after the marker on its own line, then following lines
/// up to the next `**Header**` line or heading. Items are comma separated;
/// bullets are stripped and `None` means an empty list.
pub fn declared_dependencies(task: &Task) -> Option<Vec<String>> {
    let Some(start) = task
        .content
        .iter()
        .position(|line| line.contains(DEPENDENCIES_SECTION))
    else {
        let text = task.joined_content();
        return NO_DEPENDENCY_REFERENCES
            .iter()
            .any(|name| uses_placeholder(&text, name))
            .then(Vec::new);
    };

    let mut raw = Vec::new();
    let first = &task.content[start];
    if let Some((_, rest)) = first.split_once(DEPENDENCIES_SECTION) {
        raw.push(rest.trim_start().trim_start_matches(':').to_string());
    }
    for line in &task.content[start + 1..] {
        let trimmed = line.trim();
        if is_header_line(trimmed) {
            break;
        }
        if trimmed.is_empty() {
            if raw.iter().any(|item: &String| !item.trim().is_empty()) {
                break;
            }
            continue;
        }
        raw.push(trimmed.to_string());
    }

    let ids = raw
        .iter()
        .flat_map(|line| strip_bullet(line).split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter(|item| !item.eq_ignore_ascii_case("none"))
        .filter(|item| !item.starts_with("{{"))
        .map(str::to_string)
        .collect();
    Some(ids)
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .unwrap_or(trimmed)
}

fn is_header_line(trimmed: &str) -> bool {
    if trimmed.starts_with('#') {
        return true;
    }
    strip_bullet(trimmed)
        .strip_prefix("**")
        .is_some_and(|rest| rest.contains("**"))
}

pub struct DependencyValidator;

impl Validator for DependencyValidator {
    fn name(&self) -> &'static str {
        "dependency"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        if !task.is_main() {
            return ValidationResult::success();
        }

        let Some(dependencies) = declared_dependencies(task) else {
            return ValidationResult::failure(
                ValidationError::error(
                    ErrorKind::MissingDependenciesSection,
                    &task.id,
                    format!(
                        "missing {DEPENDENCIES_SECTION} section (use `None` when there are none)"
                    ),
                )
                .with_context("accepted_references", NO_DEPENDENCY_REFERENCES.to_vec()),
            );
        };

        let mut errors = Vec::new();

        let known: BTreeSet<&str> = context.all_tasks.iter().map(|t| t.id.as_str()).collect();
        let unresolved: Vec<&str> = dependencies
            .iter()
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        if !unresolved.is_empty() {
            errors.push(
                ValidationError::error(
                    ErrorKind::InvalidDependencyReference,
                    &task.id,
                    format!("unknown dependency IDs: {}", unresolved.join(", ")),
                )
                .with_context("invalid_dependencies", unresolved),
            );
        }

        if dependencies.iter().any(|dep| *dep == task.id) {
            errors.push(
                ValidationError::error(
                    ErrorKind::CircularDependency,
                    &task.id,
                    format!("task `{}` depends on itself", task.id),
                )
                .with_context("dependency_type", "direct")
                .with_context("cycle_path", vec![task.id.clone(), task.id.clone()]),
            );
        }

        let graph = dependency_graph(context);
        if let Some(cycle) = find_cycle(&task.id, &graph) {
            errors.push(
                ValidationError::error(
                    ErrorKind::CircularDependency,
                    &task.id,
                    format!("circular dependency: {}", cycle.join(" -> ")),
                )
                .with_context("dependency_type", "transitive")
                .with_context("cycle_path", cycle),
            );
        }

        ValidationResult::failures(errors)
    }
}

/// Edges for every task that declares dependencies.
fn dependency_graph<'a>(context: &ValidationContext<'a>) -> BTreeMap<&'a str, Vec<String>> {
    context
        .all_tasks
        .iter()
        .copied()
        .filter_map(|task| declared_dependencies(task).map(|deps| (task.id.as_str(), deps)))
        .collect()
}

/// First cycle leading back to `start`, as a closed path `[start, .., start]`.
///
/// Self edges on `start` are direct cycles and are skipped here.
fn find_cycle(start: &str, graph: &BTreeMap<&str, Vec<String>>) -> Option<Vec<String>> {
    let mut path = vec![start.to_string()];
    let mut expanded = BTreeSet::from([start.to_string()]);
    walk(start, start, graph, &mut path, &mut expanded)
}

fn walk(
    node: &str,
    start: &str,
    graph: &BTreeMap<&str, Vec<String>>,
    path: &mut Vec<String>,
    expanded: &mut BTreeSet<String>,
) -> Option<Vec<String>> {
    let deps = graph.get(node)?;
    for dep in deps {
        if dep == start {
            if node == start {
                continue;
            }
            let mut cycle = path.clone();
            cycle.push(dep.clone());
            return Some(cycle);
        }
        if !expanded.insert(dep.clone()) {
            continue;
        }
        path.push(dep.clone());
        if let Some(cycle) = walk(dep, start, graph, path, expanded) {
            return Some(cycle);
        }
        path.pop();
    }
    None
}
