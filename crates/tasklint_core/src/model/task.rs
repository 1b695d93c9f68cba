//! Task document model.
//!
//! # Responsibility
//! - Define the passive records the parser hands to the validation pipeline.
//! - Provide builder-style constructors for parser and test code.
//!
//! # Invariants
//! - A `Subtask` ID derives to the ID of a `Main` task in the same document.
//! - IDs share one namespace across mains and subtasks.
//! - `category` is derived from the ID number and never set independently.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Which rule set applies to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Top-level work item, may own subtasks.
    Main,
    /// Child work item whose ID derives from its parent.
    Subtask,
}

/// Category assigned from the numeric range of a task ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    OtpGenserver,
    PhoenixWeb,
    BusinessLogic,
    DataLayer,
    Infrastructure,
    Testing,
}

impl TaskCategory {
    /// All categories in ascending default-range order.
    pub const ALL: [TaskCategory; 6] = [
        Self::OtpGenserver,
        Self::PhoenixWeb,
        Self::BusinessLogic,
        Self::DataLayer,
        Self::Infrastructure,
        Self::Testing,
    ];

    /// Stable snake_case name used in reports and configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OtpGenserver => "otp_genserver",
            Self::PhoenixWeb => "phoenix_web",
            Self::BusinessLogic => "business_logic",
            Self::DataLayer => "data_layer",
            Self::Infrastructure => "infrastructure",
            Self::Testing => "testing",
        }
    }
}

impl Display for TaskCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One main task or subtask extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Heading text after the ID. Informational only.
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: String,
    pub priority: String,
    /// Required for completed subtasks, `N.N` with optional `(partial)`.
    pub review_rating: Option<String>,
    /// Raw section lines in document order.
    pub content: Vec<String>,
    /// Only populated on `Main` tasks.
    pub subtasks: Vec<Task>,
    pub category: Option<TaskCategory>,
    /// 1-based source line of the task heading.
    pub line_number: Option<usize>,
}

impl Task {
    /// Creates an empty task of the given kind.
    pub fn new(id: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            task_type,
            status: String::new(),
            priority: String::new(),
            review_rating: None,
            content: Vec::new(),
            subtasks: Vec::new(),
            category: None,
            line_number: None,
        }
    }

    pub fn main(id: impl Into<String>) -> Self {
        Self::new(id, TaskType::Main)
    }

    pub fn subtask(id: impl Into<String>) -> Self {
        Self::new(id, TaskType::Subtask)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_review_rating(mut self, rating: impl Into<String>) -> Self {
        self.review_rating = Some(rating.into());
        self
    }

    /// Replaces content with the given lines.
    pub fn with_content<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Task>) -> Self {
        self.subtasks = subtasks;
        self
    }

    pub fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }

    pub fn is_main(&self) -> bool {
        self.task_type == TaskType::Main
    }

    pub fn is_subtask(&self) -> bool {
        self.task_type == TaskType::Subtask
    }

    /// Content lines joined with `\n`, the haystack for marker searches.
    pub fn joined_content(&self) -> String {
        self.content.join("\n")
    }
}

/// Ordered top-level tasks of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Flattens top-level tasks followed by their subtasks, depth first.
    pub fn flatten(&self) -> Vec<&Task> {
        let mut flat = Vec::new();
        for task in &self.tasks {
            flat.push(task);
            flat.extend(task.subtasks.iter());
        }
        flat
    }
}
