//! Markdown document intake.
//!
//! # Responsibility
//! - Parse task records out of a task-list document.
//! - Collect named reference blocks for existence checks.
//!
//! # Invariants
//! - Intake is lossy but never fails; rule checking happens in `validator`.

pub mod parser;
pub mod references;

use crate::config::ValidationConfig;
use crate::model::task::TaskList;
use references::References;

/// Parsed tasks plus the reference blocks defined alongside them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub tasks: TaskList,
    pub references: References,
}

/// Parses tasks and reference definitions from one document.
pub fn parse_document(text: &str, config: &ValidationConfig) -> Document {
    Document {
        tasks: parser::parse_task_list(text, config),
        references: References::collect(text),
    }
}
