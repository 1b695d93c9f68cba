//! Core validation engine for Markdown task lists.
//! Parsing, configuration and every rule live here; binaries only do I/O.

pub mod config;
pub mod document;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod validator;

pub use config::{
    Complexity, ConfigError, ConfigResult, KpiLimits, ValidationConfig, ValidationSettings,
};
pub use document::references::References;
pub use document::{parse_document, Document};
pub use logging::{init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::result::{ErrorKind, Severity, ValidationError, ValidationResult};
pub use model::task::{Task, TaskCategory, TaskList, TaskType};
pub use pipeline::{validate_markdown, validate_task_list, ValidationPipeline};
pub use validator::{ValidationContext, Validator};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
