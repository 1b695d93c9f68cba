//! Tolerant Markdown task-list parser.
//!
//! # Responsibility
//! - Turn raw document text into `Task` records with their content lines.
//! - Attach numbered (`####`) and checkbox (`- [ ]`) subtasks to their main task.
//!
//! # Invariants
//! - Parsing never fails; malformed input yields fewer or odder tasks, which
//!   the validators then report.
//! - Task category is assigned from the ID through the configuration only.

use crate::config::ValidationConfig;
use crate::model::task::{Task, TaskList, TaskType};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static TASK_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^###\s+([A-Za-z]+-?\d[A-Za-z0-9_-]*)\s*:\s*(.*?)\s*$")
        .expect("valid task heading regex")
});
static NUMBERED_SUBTASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^####\s+\d+\.\s+(.*?)\s*\(([A-Za-z]+-?\d[A-Za-z0-9_-]*)\)\s*$")
        .expect("valid numbered subtask regex")
});
static ID_SUBTASK_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^####\s+([A-Za-z]+-?\d[A-Za-z0-9_-]*)\s*:\s*(.*?)\s*$")
        .expect("valid subtask heading regex")
});
static CHECKBOX_SUBTASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*]\s+\[([ xX])\]\s+(.*?)\s*\[([A-Za-z]+-?\d[A-Za-z0-9_-]*)\]\s*$")
        .expect("valid checkbox regex")
});
static SUBTASK_ID_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{2,4}(?:-?\d{3,4}-\d+|\d{3,4}[a-z])$").expect("valid subtask shape regex")
});
static STATUS_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| field_regex("Status").expect("valid status field regex"));
static PRIORITY_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| field_regex("Priority").expect("valid priority field regex"));
static RATING_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| field_regex("Review Rating").expect("valid rating field regex"));

/// Status assigned to a checked checkbox subtask.
pub const CHECKBOX_DONE_STATUS: &str = "Completed";
/// Status assigned to an unchecked checkbox subtask.
pub const CHECKBOX_OPEN_STATUS: &str = "Planned";

/// Parses every task in `text`.
pub fn parse_task_list(text: &str, config: &ValidationConfig) -> TaskList {
    let mut tasks: Vec<Task> = Vec::new();
    let mut current: Option<usize> = None;
    let mut in_subtask = false;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        if is_section_boundary(line) {
            current = None;
            in_subtask = false;
            continue;
        }

        if let Some(caps) = TASK_HEADING_RE.captures(line) {
            let id = caps[1].to_string();
            let task_type = if SUBTASK_ID_SHAPE_RE.is_match(&id) {
                TaskType::Subtask
            } else {
                TaskType::Main
            };
            tasks.push(
                Task::new(id, task_type)
                    .with_title(&caps[2])
                    .with_line_number(line_number),
            );
            current = Some(tasks.len() - 1);
            in_subtask = false;
            continue;
        }

        let parent = current.filter(|&idx| tasks[idx].is_main());

        if let Some((id, title)) = subtask_heading(line) {
            let subtask = Task::subtask(id)
                .with_title(title)
                .with_line_number(line_number);
            match parent {
                Some(idx) => {
                    tasks[idx].subtasks.push(subtask);
                    in_subtask = true;
                }
                None => {
                    tasks.push(subtask);
                    current = Some(tasks.len() - 1);
                    in_subtask = false;
                }
            }
            continue;
        }

        let Some(idx) = current else {
            continue;
        };

        if let (Some(parent_idx), Some(caps)) = (parent, CHECKBOX_SUBTASK_RE.captures(line)) {
            let status = if caps[1].eq_ignore_ascii_case("x") {
                CHECKBOX_DONE_STATUS
            } else {
                CHECKBOX_OPEN_STATUS
            };
            let checkbox = Task::subtask(&caps[3])
                .with_title(&caps[2])
                .with_status(status)
                .with_content([line])
                .with_line_number(line_number);
            tasks[parent_idx].subtasks.push(checkbox);
            in_subtask = false;
        }

        let target = &mut tasks[idx];
        match target.subtasks.last_mut() {
            Some(subtask) if in_subtask => subtask.content.push(line.to_string()),
            _ => target.content.push(line.to_string()),
        }
    }

    for task in &mut tasks {
        fill_fields(task, config);
        for subtask in &mut task.subtasks {
            fill_fields(subtask, config);
        }
    }

    debug!(
        "event=document_parsed module=parser status=ok tasks={} subtasks={}",
        tasks.len(),
        tasks.iter().map(|task| task.subtasks.len()).sum::<usize>()
    );
    TaskList::new(tasks)
}

fn subtask_heading(line: &str) -> Option<(String, String)> {
    if let Some(caps) = NUMBERED_SUBTASK_RE.captures(line) {
        return Some((caps[2].to_string(), caps[1].to_string()));
    }
    ID_SUBTASK_HEADING_RE
        .captures(line)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

fn fill_fields(task: &mut Task, config: &ValidationConfig) {
    if task.status.is_empty() {
        if let Some(status) = first_field(&task.content, &STATUS_FIELD_RE) {
            task.status = status;
        }
    }
    if task.priority.is_empty() {
        if let Some(priority) = first_field(&task.content, &PRIORITY_FIELD_RE) {
            task.priority = priority;
        }
    }
    if task.review_rating.is_none() {
        task.review_rating = first_field(&task.content, &RATING_FIELD_RE);
    }
    task.category = config.category_for_id(&task.id);
}

fn first_field(lines: &[String], re: &Regex) -> Option<String> {
    lines
        .iter()
        .find_map(|line| re.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}

fn field_regex(label: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^\s*(?:[-*]\s*)?\*\*{}\*\*\s*:?\s*(.+?)\s*$",
        regex::escape(label)
    ))
}

fn is_section_boundary(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed == "#" || trimmed == "##" || trimmed.starts_with("# ") || trimmed.starts_with("## ")
}
