//! Human-readable rendering of a validation result.

use crate::model::result::ValidationResult;
use std::fmt::Write;

/// Renders errors, then warnings, one finding per line, followed by a
/// one-line summary.
pub fn render_text(result: &ValidationResult) -> String {
    let mut out = String::new();
    if !result.errors.is_empty() {
        out.push_str("Errors:\n");
        for error in &result.errors {
            let _ = writeln!(out, "  {error}");
        }
    }
    if !result.warnings.is_empty() {
        out.push_str("Warnings:\n");
        for warning in &result.warnings {
            let _ = writeln!(out, "  {warning}");
        }
    }
    let _ = writeln!(
        out,
        "{}: {} error(s), {} warning(s)",
        if result.valid { "valid" } else { "invalid" },
        result.error_count(),
        result.warning_count()
    );
    out
}

/// Pretty JSON form of the whole result.
pub fn render_json(result: &ValidationResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}
