//! `tasklint` command-line entry point.
//!
//! # Responsibility
//! - Read the document and optional settings file, then hand text to core.
//! - Map the outcome to an exit status: 0 valid, 1 invalid, 2 fatal.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tasklint_core::report::{render_json, render_text};
use tasklint_core::{ConfigError, TaskCategory, ValidationConfig};

const EXIT_INVALID: u8 = 1;
const EXIT_FATAL: u8 = 2;
/// Stderr stays quiet unless `--log-level` asks for more.
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Fatal CLI failures; rule violations are never reported through this type.
#[derive(Debug)]
enum CliError {
    Read { path: PathBuf, source: std::io::Error },
    Config(ConfigError),
    Serialize(serde_json::Error),
    Logging(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize result: {err}"),
            Self::Logging(message) => write!(f, "failed to start logging: {message}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Config(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_INVALID),
        Err(err) => {
            error!("event=cli_failed module=cli status=error error={err}");
            eprintln!("tasklint: {err}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Runs one command; `Ok(false)` means the document has rule violations.
fn run(cli: &Cli) -> Result<bool, CliError> {
    tasklint_core::init_stderr_logging(log_level(cli)).map_err(CliError::Logging)?;

    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Validate { file, format } => validate(file, *format, &config),
        Commands::Categories => {
            print!("{}", render_categories(&config));
            Ok(true)
        }
    }
}

fn log_level(cli: &Cli) -> &str {
    cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
}

fn load_config(path: Option<&Path>) -> Result<ValidationConfig, CliError> {
    let Some(path) = path else {
        return Ok(ValidationConfig::default());
    };
    let raw = read(path)?;
    let config = ValidationConfig::from_json_str(&raw)?;
    info!(
        "event=config_loaded module=cli status=ok path={}",
        path.display()
    );
    Ok(config)
}

fn validate(
    file: &Path,
    format: OutputFormat,
    config: &ValidationConfig,
) -> Result<bool, CliError> {
    let text = read(file)?;
    let result = tasklint_core::validate_markdown(&text, config);
    match format {
        OutputFormat::Text => print!("{}", render_text(&result)),
        OutputFormat::Json => println!("{}", render_json(&result)?),
    }
    Ok(result.valid)
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn render_categories(config: &ValidationConfig) -> String {
    TaskCategory::ALL
        .iter()
        .filter_map(|category| {
            config.category_ranges().get(category).map(|range| {
                format!(
                    "{:<16} {:>4}-{:<4} {}\n",
                    category.as_str(),
                    range.min,
                    range.max,
                    config.required_sections_for(*category).join(", ")
                )
            })
        })
        .collect()
}
