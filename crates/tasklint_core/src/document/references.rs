//! Reference definition blocks and placeholder lookup.
//!
//! # Responsibility
//! - Collect `## {{name}}` definition blocks keyed by bare name.
//! - Find `{{name}}` placeholders inside task content.
//!
//! # Invariants
//! - Lookup is read-only and one level deep; content is never expanded.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([A-Za-z0-9_-]+)\}\}").expect("valid placeholder regex"));
static DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^##\s+\{\{([A-Za-z0-9_-]+)\}\}\s*$").expect("valid definition regex")
});

/// Name to content-lines map of every reference defined in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    blocks: BTreeMap<String, Vec<String>>,
}

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans document text for `## {{name}}` blocks.
    ///
    /// A block runs until the next `#` or `##` heading. Deeper headings stay
    /// inside the block. A later definition of the same name replaces the
    /// earlier one.
    pub fn collect(text: &str) -> Self {
        let mut references = Self::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in text.lines() {
            if let Some(caps) = DEFINITION_RE.captures(line.trim_end()) {
                if let Some((name, lines)) = current.take() {
                    references.insert(name, lines);
                }
                current = Some((caps[1].to_string(), Vec::new()));
                continue;
            }
            if is_block_boundary(line) {
                if let Some((name, lines)) = current.take() {
                    references.insert(name, lines);
                }
                continue;
            }
            if let Some((_, lines)) = current.as_mut() {
                lines.push(line.to_string());
            }
        }
        if let Some((name, lines)) = current.take() {
            references.insert(name, lines);
        }
        references
    }

    /// Adds or replaces one definition, trimming trailing blank lines.
    pub fn insert(&mut self, name: impl Into<String>, mut lines: Vec<String>) {
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }
        self.blocks.insert(name.into(), lines);
    }

    /// Builder form of `insert`, mostly for tests.
    pub fn with<I, S>(mut self, name: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, lines.into_iter().map(Into::into).collect());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Option<&[String]> {
        self.blocks.get(name).map(Vec::as_slice)
    }

    /// Resolved block joined with `\n`.
    pub fn resolve_text(&self, name: &str) -> Option<String> {
        self.resolve(name).map(|lines| lines.join("\n"))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Distinct placeholder names in `text`, in order of first appearance.
pub fn placeholders_in(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Whether `text` contains the literal `{{name}}` placeholder.
pub fn uses_placeholder(text: &str, name: &str) -> bool {
    text.contains(&format!("{{{{{name}}}}}"))
}

fn is_block_boundary(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("# ") || trimmed.starts_with("## ") || trimmed == "#" || trimmed == "##"
}

#[cfg(test)]
mod tests {
    use super::{placeholders_in, uses_placeholder, References};

    const DOC: &str = "\
# Tasks

### SSH0001: Something
{{error-handling}}

## {{error-handling}}
**Error Handling**
**Core Principles**
- Let it crash

## {{standard-kpis}}
**Code Quality KPIs**
- Functions per module: 3
### nested heading stays
## Next Section
not part of a block
";

    #[test]
    fn collects_blocks_until_next_top_heading() {
        let refs = References::collect(DOC);
        assert_eq!(refs.len(), 2);
        assert_eq!(
            refs.resolve("error-handling").expect("block exists"),
            &["**Error Handling**", "**Core Principles**", "- Let it crash"]
        );
        let kpis = refs.resolve_text("standard-kpis").expect("block exists");
        assert!(kpis.contains("### nested heading stays"));
        assert!(!kpis.contains("not part of a block"));
    }

    #[test]
    fn finds_distinct_placeholders_in_order() {
        let names = placeholders_in("{{b}} then {{a}} and {{b}} again, not {{ c }}");
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn literal_placeholder_check_uses_braces() {
        assert!(uses_placeholder("see {{standard-kpis}}", "standard-kpis"));
        assert!(!uses_placeholder("see standard-kpis", "standard-kpis"));
    }
}
