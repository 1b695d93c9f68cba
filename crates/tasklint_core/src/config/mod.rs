//! Validation configuration.
//!
//! # Responsibility
//! - Hold the serializable settings shape with documented defaults.
//! - Compile settings into an immutable, checked `ValidationConfig`.
//!
//! # Invariants
//! - A `ValidationConfig` always carries compiled regexes.
//! - Category ranges are non-inverted and never overlap.
//! - The core never reads files or environment; callers pass text in.

mod settings;

pub use settings::{
    CategoryRange, Complexity, ComplexityMultipliers, KpiLimits, ValidationSettings,
};

use crate::model::task::TaskCategory;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Alternate main-task ID shape accepted next to the configured regex.
static DASH_MAIN_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,4}-\d{3,4}$").expect("valid dash id regex"));

/// Task number extraction for main and subtask ID shapes. Digit counts are
/// left to `id_pattern`, so custom ID shapes still categorize.
static TASK_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]+-?(\d+)(?:-\d+|[a-z])?$").expect("valid task number regex")
});

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal configuration problems. These abort a run before any validation.
#[derive(Debug)]
pub enum ConfigError {
    InvalidRegex {
        field: &'static str,
        pattern: String,
        message: String,
    },
    EmptyList(&'static str),
    InvertedRange {
        category: TaskCategory,
        min: u32,
        max: u32,
    },
    OverlappingRanges(TaskCategory, TaskCategory),
    InvalidMultiplier {
        complexity: Complexity,
        value: f64,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRegex {
                field,
                pattern,
                message,
            } => write!(f, "invalid regex for `{field}` (`{pattern}`): {message}"),
            Self::EmptyList(field) => write!(f, "`{field}` must not be empty"),
            Self::InvertedRange { category, min, max } => write!(
                f,
                "category range for `{category}` is inverted: {min} > {max}"
            ),
            Self::OverlappingRanges(left, right) => {
                write!(f, "category ranges overlap: `{left}` and `{right}`")
            }
            Self::InvalidMultiplier { complexity, value } => write!(
                f,
                "complexity multiplier for `{}` must be positive, got {value}",
                complexity.as_str()
            ),
            Self::Parse(err) => write!(f, "invalid settings document: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Checked configuration snapshot threaded through every validator.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    settings: ValidationSettings,
    id_regex: Regex,
    rating_regex: Regex,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::from_settings(ValidationSettings::default())
            .expect("built-in validation settings are valid")
    }
}

impl ValidationConfig {
    /// Compiles and checks settings.
    ///
    /// # Errors
    /// - Returns `ConfigError::InvalidRegex` when a pattern does not compile.
    /// - Returns `ConfigError::EmptyList` when statuses or priorities are empty.
    /// - Returns range and multiplier errors for inconsistent tables.
    pub fn from_settings(settings: ValidationSettings) -> ConfigResult<Self> {
        if settings.valid_statuses.is_empty() {
            return Err(ConfigError::EmptyList("valid_statuses"));
        }
        if settings.valid_priorities.is_empty() {
            return Err(ConfigError::EmptyList("valid_priorities"));
        }

        let id_regex = compile("id_pattern", &settings.id_pattern)?;
        let rating_regex = compile("rating_pattern", &settings.rating_pattern)?;
        check_ranges(&settings.category_ranges)?;
        check_multipliers(&settings.complexity_multipliers)?;

        debug!(
            "event=config_loaded module=config status=ok statuses={} categories={}",
            settings.valid_statuses.len(),
            settings.category_ranges.len()
        );

        Ok(Self {
            settings,
            id_regex,
            rating_regex,
        })
    }

    /// Parses JSON settings (partial documents fall back to defaults) and compiles them.
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        Self::from_settings(ValidationSettings::from_json_str(raw)?)
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    pub fn valid_statuses(&self) -> &[String] {
        &self.settings.valid_statuses
    }

    pub fn valid_priorities(&self) -> &[String] {
        &self.settings.valid_priorities
    }

    pub fn is_valid_status(&self, status: &str) -> bool {
        self.settings.valid_statuses.iter().any(|s| s == status)
    }

    pub fn is_valid_priority(&self, priority: &str) -> bool {
        self.settings.valid_priorities.iter().any(|p| p == priority)
    }

    /// Main ID check: configured regex or the dash-delimited numeric form.
    pub fn is_valid_main_id(&self, id: &str) -> bool {
        self.id_regex.is_match(id) || DASH_MAIN_ID_RE.is_match(id)
    }

    /// Configured ID regex only, without the dash alternative.
    pub fn matches_id_pattern(&self, id: &str) -> bool {
        self.id_regex.is_match(id)
    }

    pub fn is_valid_rating(&self, rating: &str) -> bool {
        self.rating_regex.is_match(rating.trim())
    }

    pub fn kpi_limits(&self) -> &KpiLimits {
        &self.settings.kpi_limits
    }

    pub fn category_ranges(&self) -> &BTreeMap<TaskCategory, CategoryRange> {
        &self.settings.category_ranges
    }

    pub fn required_sections_for(&self, category: TaskCategory) -> &[String] {
        self.settings
            .category_required_sections
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn semantic_prefixes_enabled(&self) -> bool {
        self.settings.enable_semantic_prefixes
    }

    pub fn semantic_category(&self, prefix: &str) -> Option<TaskCategory> {
        self.settings.semantic_prefixes.get(prefix).copied()
    }

    pub fn known_semantic_prefixes(&self) -> &[String] {
        &self.settings.known_semantic_prefixes
    }

    pub fn multiplier(&self, complexity: Complexity) -> f64 {
        self.settings.complexity_multipliers.get(complexity)
    }

    /// Category default complexity, `Medium` when the category is unmapped.
    pub fn default_complexity(&self, category: Option<TaskCategory>) -> Complexity {
        category
            .and_then(|c| self.settings.category_default_complexity.get(&c).copied())
            .unwrap_or(Complexity::Medium)
    }

    /// Numeric portion of an ID. Subtask IDs yield their parent's number.
    pub fn task_number(&self, id: &str) -> Option<u32> {
        TASK_NUMBER_RE
            .captures(id)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// First configured range containing `number`.
    pub fn category_for_number(&self, number: u32) -> Option<TaskCategory> {
        self.settings
            .category_ranges
            .iter()
            .find(|(_, range)| range.contains(number))
            .map(|(category, _)| *category)
    }

    /// Category derived purely from the ID and the range table.
    pub fn category_for_id(&self, id: &str) -> Option<TaskCategory> {
        self.task_number(id)
            .and_then(|number| self.category_for_number(number))
    }
}

fn compile(field: &'static str, pattern: &str) -> ConfigResult<Regex> {
    Regex::new(pattern).map_err(|err| ConfigError::InvalidRegex {
        field,
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

fn check_ranges(ranges: &BTreeMap<TaskCategory, CategoryRange>) -> ConfigResult<()> {
    for (category, range) in ranges {
        if range.min > range.max {
            return Err(ConfigError::InvertedRange {
                category: *category,
                min: range.min,
                max: range.max,
            });
        }
    }

    let entries: Vec<_> = ranges.iter().collect();
    for (index, (left, left_range)) in entries.iter().enumerate() {
        for (right, right_range) in entries.iter().skip(index + 1) {
            if left_range.min <= right_range.max && right_range.min <= left_range.max {
                return Err(ConfigError::OverlappingRanges(**left, **right));
            }
        }
    }
    Ok(())
}

fn check_multipliers(multipliers: &ComplexityMultipliers) -> ConfigResult<()> {
    for complexity in Complexity::ALL {
        let value = multipliers.get(complexity);
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::InvalidMultiplier { complexity, value });
        }
    }
    Ok(())
}
