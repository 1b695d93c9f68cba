//! Serializable settings shape and built-in defaults.

use super::ConfigResult;
use crate::model::task::TaskCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complexity tier used to scale KPI ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
    Critical,
}

impl Complexity {
    pub const ALL: [Complexity; 4] = [
        Self::Simple,
        Self::Medium,
        Self::Complex,
        Self::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
            Self::Critical => "critical",
        }
    }

    /// Case-insensitive parse of a tier name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Some(Self::Simple),
            "medium" => Some(Self::Medium),
            "complex" => Some(Self::Complex),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Multipliers applied to ceiling-type KPI limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityMultipliers {
    pub simple: f64,
    pub medium: f64,
    pub complex: f64,
    pub critical: f64,
}

impl Default for ComplexityMultipliers {
    fn default() -> Self {
        Self {
            simple: 1.0,
            medium: 1.5,
            complex: 2.0,
            critical: 3.0,
        }
    }
}

impl ComplexityMultipliers {
    pub fn get(&self, complexity: Complexity) -> f64 {
        match complexity {
            Complexity::Simple => self.simple,
            Complexity::Medium => self.medium,
            Complexity::Complex => self.complex,
            Complexity::Critical => self.critical,
        }
    }
}

/// Base KPI limits before complexity scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiLimits {
    pub max_functions_per_module: u32,
    pub max_lines_per_function: u32,
    pub max_call_depth: u32,
    pub max_pattern_match_depth: u32,
    /// Zero-tolerance metric, never scaled.
    pub max_dialyzer_warnings: u32,
    /// Floor metric, higher is better, never scaled.
    pub min_credo_score: f64,
    pub max_genserver_state_complexity: u32,
    pub max_phoenix_context_boundaries: u32,
    pub max_ecto_query_complexity: u32,
}

impl Default for KpiLimits {
    fn default() -> Self {
        Self {
            max_functions_per_module: 8,
            max_lines_per_function: 15,
            max_call_depth: 2,
            max_pattern_match_depth: 4,
            max_dialyzer_warnings: 0,
            min_credo_score: 8.0,
            max_genserver_state_complexity: 5,
            max_phoenix_context_boundaries: 3,
            max_ecto_query_complexity: 4,
        }
    }
}

/// Inclusive task-number range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRange {
    pub min: u32,
    pub max: u32,
}

impl CategoryRange {
    pub fn contains(&self, number: u32) -> bool {
        (self.min..=self.max).contains(&number)
    }
}

/// Raw settings as loaded from JSON; missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub valid_statuses: Vec<String>,
    pub valid_priorities: Vec<String>,
    pub id_pattern: String,
    pub rating_pattern: String,
    pub kpi_limits: KpiLimits,
    pub category_ranges: BTreeMap<TaskCategory, CategoryRange>,
    pub category_required_sections: BTreeMap<TaskCategory, Vec<String>>,
    pub enable_semantic_prefixes: bool,
    pub semantic_prefixes: BTreeMap<String, TaskCategory>,
    /// Prefixes treated as semantic even when shorter than three letters.
    pub known_semantic_prefixes: Vec<String>,
    pub complexity_multipliers: ComplexityMultipliers,
    pub category_default_complexity: BTreeMap<TaskCategory, Complexity>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            valid_statuses: strings(&["Planned", "In Progress", "Review", "Completed", "Blocked"]),
            valid_priorities: strings(&["Critical", "High", "Medium", "Low"]),
            id_pattern: r"^[A-Z]{2,4}\d{3,4}$".to_string(),
            rating_pattern: r"^(?:[1-4]\.\d|5\.0)(?:\s*\(partial\))?$".to_string(),
            kpi_limits: KpiLimits::default(),
            category_ranges: default_category_ranges(),
            category_required_sections: default_category_sections(),
            enable_semantic_prefixes: false,
            semantic_prefixes: default_semantic_prefixes(),
            known_semantic_prefixes: strings(&["DB", "UI", "QA"]),
            complexity_multipliers: ComplexityMultipliers::default(),
            category_default_complexity: default_category_complexity(),
        }
    }
}

impl ValidationSettings {
    /// Parses a JSON settings document. Absent fields keep their defaults.
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn default_category_ranges() -> BTreeMap<TaskCategory, CategoryRange> {
    [
        (TaskCategory::OtpGenserver, 1, 99),
        (TaskCategory::PhoenixWeb, 100, 199),
        (TaskCategory::BusinessLogic, 200, 299),
        (TaskCategory::DataLayer, 300, 399),
        (TaskCategory::Infrastructure, 400, 499),
        (TaskCategory::Testing, 500, 599),
    ]
    .into_iter()
    .map(|(category, min, max)| (category, CategoryRange { min, max }))
    .collect()
}

fn default_category_sections() -> BTreeMap<TaskCategory, Vec<String>> {
    BTreeMap::from([
        (
            TaskCategory::OtpGenserver,
            strings(&[
                "**Process Design**",
                "**State Management**",
                "**Supervision Strategy**",
            ]),
        ),
        (
            TaskCategory::PhoenixWeb,
            strings(&[
                "**Route Design**",
                "**Context Integration**",
                "**Template/Component Strategy**",
            ]),
        ),
        (
            TaskCategory::BusinessLogic,
            strings(&["**Context Boundaries**", "**Business Rules**"]),
        ),
        (
            TaskCategory::DataLayer,
            strings(&[
                "**Schema Design**",
                "**Migration Strategy**",
                "**Query Optimization**",
            ]),
        ),
        (
            TaskCategory::Infrastructure,
            strings(&[
                "**Release Configuration**",
                "**Environment Variables**",
                "**Deployment Strategy**",
            ]),
        ),
        (
            TaskCategory::Testing,
            strings(&[
                "**Test Strategy**",
                "**Coverage Requirements**",
                "**Property-Based Testing**",
            ]),
        ),
    ])
}

fn default_semantic_prefixes() -> BTreeMap<String, TaskCategory> {
    [
        ("OTP", TaskCategory::OtpGenserver),
        ("GEN", TaskCategory::OtpGenserver),
        ("PHX", TaskCategory::PhoenixWeb),
        ("WEB", TaskCategory::PhoenixWeb),
        ("CTX", TaskCategory::BusinessLogic),
        ("BIZ", TaskCategory::BusinessLogic),
        ("DB", TaskCategory::DataLayer),
        ("DATA", TaskCategory::DataLayer),
        ("ECT", TaskCategory::DataLayer),
        ("INF", TaskCategory::Infrastructure),
        ("OPS", TaskCategory::Infrastructure),
        ("TST", TaskCategory::Testing),
        ("TEST", TaskCategory::Testing),
    ]
    .into_iter()
    .map(|(prefix, category)| (prefix.to_string(), category))
    .collect()
}

fn default_category_complexity() -> BTreeMap<TaskCategory, Complexity> {
    BTreeMap::from([
        (TaskCategory::OtpGenserver, Complexity::Medium),
        (TaskCategory::PhoenixWeb, Complexity::Simple),
        (TaskCategory::BusinessLogic, Complexity::Medium),
        (TaskCategory::DataLayer, Complexity::Simple),
        (TaskCategory::Infrastructure, Complexity::Complex),
        (TaskCategory::Testing, Complexity::Complex),
    ])
}
