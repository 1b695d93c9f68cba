use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Validates Markdown task lists against the task-document rules.
#[derive(Debug, Parser)]
#[command(name = "tasklint", version, about = "Markdown task-list validator")]
pub struct Cli {
    /// JSON settings file overriding the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level for stderr diagnostics (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate one task-list document
    Validate {
        /// Markdown file to check
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the configured category ranges
    Categories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat};
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_validate_with_global_flags() {
        let cli = Cli::try_parse_from([
            "tasklint",
            "validate",
            "tasks.md",
            "--format",
            "json",
            "--config",
            "rules.json",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("rules.json")));
        match cli.command {
            Commands::Validate { file, format } => {
                assert_eq!(file, std::path::PathBuf::from("tasks.md"));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn validate_requires_a_file() {
        assert!(Cli::try_parse_from(["tasklint", "validate"]).is_err());
    }
}
