//! Code-quality KPI presence and limit rules.
//!
//! # Responsibility
//! - Extract labeled numeric metrics (`Label: number`, case-insensitive).
//! - Require the three core metrics unless a KPI reference is used.
//! - Compare metrics against limits scaled by task complexity.
//!
//! # Invariants
//! - Ceiling limits are scaled by the complexity multiplier and rounded.
//! - Floor (Credo score) and zero-tolerance (Dialyzer) limits are never scaled.

use super::{recognized_reference, ReferenceUse, ValidationContext, Validator};
use crate::config::{Complexity, KpiLimits, ValidationConfig};
use crate::model::result::{ErrorKind, ValidationError, ValidationResult};
use crate::model::task::Task;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const KPI_SECTION: &str = "**Code Quality KPIs**";
pub const KPI_REFERENCES: &[&str] = &["standard-kpis", "code-quality-kpis", "kpis"];

static COMPLEXITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\*\*Complexity Assessment\*\*\s*:?\s*(?:[-*]\s*)?(?:overall\s*:?\s*)?(simple|medium|complex|critical)\b",
    )
    .expect("valid complexity regex")
});

static METRIC_PATTERNS: Lazy<Vec<(KpiMetric, Regex)>> = Lazy::new(|| {
    KpiMetric::ALL
        .iter()
        .map(|metric| {
            let label = metric.label().replace(' ', r"\s+");
            let pattern = format!(r"(?i)\b{label}\s*:\s*(\d+(?:\.\d+)?)");
            (
                *metric,
                Regex::new(&pattern).expect("valid kpi metric regex"),
            )
        })
        .collect()
});

/// How a metric is compared against its configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitRule {
    /// `value <= round(limit * multiplier)`.
    Ceiling,
    /// `value <= limit`, unscaled.
    ZeroTolerance,
    /// `value >= limit`, unscaled.
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiMetric {
    FunctionsPerModule,
    LinesPerFunction,
    CallDepth,
    PatternMatchDepth,
    DialyzerWarnings,
    CredoScore,
    GenServerStateComplexity,
    PhoenixContextBoundaries,
    EctoQueryComplexity,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 9] = [
        Self::FunctionsPerModule,
        Self::LinesPerFunction,
        Self::CallDepth,
        Self::PatternMatchDepth,
        Self::DialyzerWarnings,
        Self::CredoScore,
        Self::GenServerStateComplexity,
        Self::PhoenixContextBoundaries,
        Self::EctoQueryComplexity,
    ];

    /// Line label as written in documents.
    pub fn label(self) -> &'static str {
        match self {
            Self::FunctionsPerModule => "Functions per module",
            Self::LinesPerFunction => "Lines per function",
            Self::CallDepth => "Call depth",
            Self::PatternMatchDepth => "Pattern match depth",
            Self::DialyzerWarnings => "Dialyzer warnings",
            Self::CredoScore => "Credo score",
            Self::GenServerStateComplexity => "GenServer state complexity",
            Self::PhoenixContextBoundaries => "Phoenix context boundaries",
            Self::EctoQueryComplexity => "Ecto query complexity",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::FunctionsPerModule => "functions_per_module",
            Self::LinesPerFunction => "lines_per_function",
            Self::CallDepth => "call_depth",
            Self::PatternMatchDepth => "pattern_match_depth",
            Self::DialyzerWarnings => "dialyzer_warnings",
            Self::CredoScore => "credo_score",
            Self::GenServerStateComplexity => "genserver_state_complexity",
            Self::PhoenixContextBoundaries => "phoenix_context_boundaries",
            Self::EctoQueryComplexity => "ecto_query_complexity",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            Self::FunctionsPerModule | Self::LinesPerFunction | Self::CallDepth
        )
    }

    pub fn rule(self) -> LimitRule {
        match self {
            Self::CredoScore => LimitRule::Floor,
            Self::DialyzerWarnings => LimitRule::ZeroTolerance,
            _ => LimitRule::Ceiling,
        }
    }

    pub fn base_limit(self, limits: &KpiLimits) -> f64 {
        match self {
            Self::FunctionsPerModule => f64::from(limits.max_functions_per_module),
            Self::LinesPerFunction => f64::from(limits.max_lines_per_function),
            Self::CallDepth => f64::from(limits.max_call_depth),
            Self::PatternMatchDepth => f64::from(limits.max_pattern_match_depth),
            Self::DialyzerWarnings => f64::from(limits.max_dialyzer_warnings),
            Self::CredoScore => limits.min_credo_score,
            Self::GenServerStateComplexity => f64::from(limits.max_genserver_state_complexity),
            Self::PhoenixContextBoundaries => f64::from(limits.max_phoenix_context_boundaries),
            Self::EctoQueryComplexity => f64::from(limits.max_ecto_query_complexity),
        }
    }
}

/// Metrics found in `text`, in `KpiMetric::ALL` order. First match wins.
pub fn extract_metrics(text: &str) -> Vec<(KpiMetric, f64)> {
    METRIC_PATTERNS
        .iter()
        .filter_map(|(metric, re)| {
            re.captures(text)
                .and_then(|caps| caps[1].parse::<f64>().ok())
                .map(|value| (*metric, value))
        })
        .collect()
}

/// Declared complexity, else the category default, else medium.
pub fn task_complexity(task: &Task, text: &str, config: &ValidationConfig) -> Complexity {
    COMPLEXITY_RE
        .captures(text)
        .and_then(|caps| Complexity::parse(&caps[1]))
        .unwrap_or_else(|| config.default_complexity(config.category_for_id(&task.id)))
}

pub struct KpiValidator;

impl Validator for KpiValidator {
    fn name(&self) -> &'static str {
        "kpi"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn validate(&self, task: &Task, context: &ValidationContext<'_>) -> ValidationResult {
        if !task.is_main() {
            return ValidationResult::success();
        }
        let config = context.config;
        let mut text = task.joined_content();
        let mut via_reference = false;

        if !text.contains(KPI_SECTION) {
            match recognized_reference(&text, KPI_REFERENCES, context.references) {
                ReferenceUse::Resolved(name) => {
                    if let Some(resolved) = context.references.resolve_text(&name) {
                        text.push('\n');
                        text.push_str(&resolved);
                    }
                    via_reference = true;
                }
                ReferenceUse::Missing(name) => {
                    return ValidationResult::failure(
                        ValidationError::error(
                            ErrorKind::MissingKpiSection,
                            &task.id,
                            format!("KPI reference `{{{{{name}}}}}` is not defined"),
                        )
                        .with_context("reference", name),
                    );
                }
                ReferenceUse::NotUsed => {
                    return ValidationResult::failure(
                        ValidationError::error(
                            ErrorKind::MissingKpiSection,
                            &task.id,
                            format!("missing {KPI_SECTION} section"),
                        )
                        .with_context("accepted_references", KPI_REFERENCES.to_vec()),
                    );
                }
            }
        }

        let metrics = extract_metrics(&text);
        let mut errors = Vec::new();

        if !via_reference {
            let missing: Vec<&str> = KpiMetric::ALL
                .iter()
                .filter(|metric| metric.is_required())
                .filter(|metric| !metrics.iter().any(|(found, _)| found == *metric))
                .map(|metric| metric.label())
                .collect();
            if !missing.is_empty() {
                errors.push(
                    ValidationError::error(
                        ErrorKind::MissingKpiMetrics,
                        &task.id,
                        format!("missing required KPI metrics: {}", missing.join(", ")),
                    )
                    .with_context("missing_metrics", missing),
                );
            }
        }

        let complexity = task_complexity(task, &text, config);
        let multiplier = config.multiplier(complexity);
        for (metric, value) in metrics {
            if let Some(error) = check_limit(task, metric, value, complexity, multiplier, config) {
                errors.push(error);
            }
        }

        ValidationResult::failures(errors)
    }
}

fn check_limit(
    task: &Task,
    metric: KpiMetric,
    value: f64,
    complexity: Complexity,
    multiplier: f64,
    config: &ValidationConfig,
) -> Option<ValidationError> {
    let base = metric.base_limit(config.kpi_limits());
    let (limit, violated, relation) = match metric.rule() {
        LimitRule::Ceiling => {
            let scaled = (base * multiplier).round();
            (scaled, value > scaled, "at most")
        }
        LimitRule::ZeroTolerance => (base, value > base, "at most"),
        LimitRule::Floor => (base, value < base, "at least"),
    };
    if !violated {
        return None;
    }

    let scaled = metric.rule() == LimitRule::Ceiling;
    Some(
        ValidationError::error(
            ErrorKind::InvalidKpiValue,
            &task.id,
            format!(
                "{} is {} but must be {relation} {} ({} complexity)",
                metric.label(),
                number(value),
                number(limit),
                complexity.as_str()
            ),
        )
        .with_context("metric", metric.key())
        .with_context("actual", number(value))
        .with_context("limit", number(limit))
        .with_context("base_limit", number(base))
        .with_context("complexity", complexity.as_str())
        .with_context("multiplier", if scaled { multiplier } else { 1.0 }),
    )
}

/// Integral values as JSON integers, others as floats.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}
