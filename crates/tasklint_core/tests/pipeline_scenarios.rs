use tasklint_core::{validate_markdown, ErrorKind, ValidationConfig, ValidationResult};

const REFERENCES: &str = "\
## {{error-handling}}
**Error Handling**
**Core Principles**
- Pass raw errors
- Use {:ok, result} | {:error, reason}
- Let it crash
**Error Implementation**
- No wrapping
- Minimal rescue
- function/1 & /2 patterns
**Error Examples**
- Raw error passthrough
- Simple rescue case
- Supervisor handling
**GenServer Specifics**
- Handle_call/3 error pattern
- Terminate/2 proper usage
- Process linking considerations

## {{error-handling-subtask}}
**Error Handling**
**Task-Specific Approach**
- Error pattern for this task
**Error Reporting**
- Monitoring approach

## {{standard-kpis}}
**Code Quality KPIs**
- Functions per module: 6
- Lines per function: 12
- Call depth: 2
";

/// A main task in the OTP range that satisfies every rule when `body`
/// supplies the subtasks its status needs.
fn main_task(id: &str, status: &str, dependencies: &str, body: &str) -> String {
    format!(
        "\
### {id}: Task {id}
**Description**
Pool SSH connections per host.
**Status**: {status}
**Priority**: High
**Dependencies**: {dependencies}
**Process Design**
**State Management**
**Supervision Strategy**
{{{{error-handling}}}}
{{{{standard-kpis}}}}
{body}
"
    )
}

fn numbered_subtask(id: &str) -> String {
    format!(
        "\
#### 1. Define pool state ({id})
**Description**
State struct.
**Status**: Planned
{{{{error-handling-subtask}}}}
"
    )
}

fn document(tasks: &[String]) -> String {
    format!(
        "# Project Tasks\n\n## Current Tasks\n\n{}\n{REFERENCES}",
        tasks.join("\n")
    )
}

fn validate(tasks: &[String]) -> ValidationResult {
    validate_markdown(&document(tasks), &ValidationConfig::default())
}

fn kinds(result: &ValidationResult) -> Vec<ErrorKind> {
    result.errors.iter().map(|error| error.kind).collect()
}

#[test]
fn conforming_document_is_valid() {
    let body = format!(
        "{}\n- [ ] Document pool API [SSH0001a]",
        numbered_subtask("SSH0001-1")
    );
    let result = validate(&[main_task("SSH0001", "In Progress", "None", &body)]);

    assert!(result.valid, "unexpected errors: {:?}", result.errors);
    assert!(result.warnings.is_empty());
}

#[test]
fn in_progress_task_without_subtasks_fails_once() {
    let result = validate(&[main_task("SSH0001", "In Progress", "None", "")]);
    assert_eq!(kinds(&result), vec![ErrorKind::MissingSubtasksForInProgress]);
}

#[test]
fn planned_task_without_subtasks_is_valid() {
    let result = validate(&[main_task("SSH0001", "Planned", "None", "")]);
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
}

#[test]
fn orphan_subtask_reports_only_missing_parent() {
    let orphan = "\
### SSH0007-1: Orphan
**Description**
Lost.
**Status**: Planned
{{error-handling-subtask}}
"
    .to_string();
    let result = validate(&[main_task("SSH0001", "Planned", "None", ""), orphan]);

    assert_eq!(kinds(&result), vec![ErrorKind::InvalidSubtaskId]);
    assert_eq!(result.errors[0].task_id, "SSH0007-1");
    assert_eq!(result.errors[0].context["parent_id"], "SSH0007");
}

#[test]
fn self_dependency_is_a_direct_cycle() {
    let result = validate(&[main_task("SSH0001", "Planned", "SSH0001", "")]);

    assert_eq!(kinds(&result), vec![ErrorKind::CircularDependency]);
    assert_eq!(result.errors[0].context["dependency_type"], "direct");
}

#[test]
fn each_task_on_a_cycle_reports_its_rotation() {
    let result = validate(&[
        main_task("SSH0001", "Planned", "SSH0002", ""),
        main_task("SSH0002", "Planned", "SSH0003", ""),
        main_task("SSH0003", "Planned", "SSH0001", ""),
    ]);

    let cycles = result.findings_of(ErrorKind::CircularDependency);
    assert_eq!(cycles.len(), 3);
    for cycle in cycles {
        let path = cycle.context["cycle_path"]
            .as_array()
            .expect("cycle path should be an array");
        assert_eq!(path.len(), 4);
        assert_eq!(path.first(), path.last());
        assert_eq!(path[0], cycle.task_id.as_str());
    }
}

#[test]
fn dependency_on_a_subtask_resolves() {
    let body = numbered_subtask("SSH0001-1");
    let result = validate(&[
        main_task("SSH0001", "In Progress", "None", &body),
        main_task("SSH0002", "Planned", "SSH0001-1", ""),
    ]);
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
}

#[test]
fn unknown_dependency_is_reported() {
    let result = validate(&[main_task("SSH0001", "Planned", "SSH0042", "")]);

    assert_eq!(kinds(&result), vec![ErrorKind::InvalidDependencyReference]);
    assert_eq!(
        result.errors[0].context["invalid_dependencies"],
        serde_json::json!(["SSH0042"])
    );
}

#[test]
fn undefined_kpi_reference_is_reported_by_name() {
    let text = document(&[main_task("SSH0001", "Planned", "None", "")])
        .replace("## {{standard-kpis}}", "## Notes");
    let result = validate_markdown(&text, &ValidationConfig::default());

    assert_eq!(kinds(&result), vec![ErrorKind::MissingKpiSection]);
    assert_eq!(result.errors[0].context["reference"], "standard-kpis");
}

#[test]
fn inline_kpi_overrides_are_checked_against_scaled_limits() {
    let text = |value: u32| {
        document(&[main_task("SSH0001", "Planned", "None", "")]).replacen(
            "{{standard-kpis}}\n",
            &format!(
                "**Code Quality KPIs**\n- Functions per module: {value}\n\
                 - Lines per function: 10\n- Call depth: 2\n"
            ),
            1,
        )
    };
    let config = ValidationConfig::default();

    assert!(validate_markdown(&text(12), &config).valid);
    let over = validate_markdown(&text(13), &config);
    assert_eq!(kinds(&over), vec![ErrorKind::InvalidKpiValue]);
    assert_eq!(over.errors[0].context["limit"], 12);
}

#[test]
fn checkbox_subtask_passes_where_numbered_sibling_fails() {
    let checkbox = validate(&[main_task(
        "SSH0001",
        "In Progress",
        "None",
        "- [ ] Sketch API [SSH0001a]",
    )]);
    assert!(checkbox.valid, "unexpected errors: {:?}", checkbox.errors);

    let numbered = validate(&[main_task(
        "SSH0001",
        "In Progress",
        "None",
        "#### 1. Sketch API (SSH0001-1)\n**Description**\nSketch.\n**Status**: Planned\n",
    )]);
    assert_eq!(kinds(&numbered), vec![ErrorKind::MissingSubtaskSections]);
}

#[test]
fn nested_numbered_subtask_needs_a_description() {
    let body =
        numbered_subtask("SSH0001-1").replacen("**Description**\nState struct.\n", "", 1);
    let result = validate(&[main_task("SSH0001", "In Progress", "None", &body)]);

    assert_eq!(kinds(&result), vec![ErrorKind::MissingRequiredSection]);
    assert_eq!(result.errors[0].task_id, "SSH0001-1");
    assert_eq!(
        result.errors[0].context["missing_sections"],
        serde_json::json!(["**Description**"])
    );
}

#[test]
fn nested_numbered_subtask_with_bare_error_handling_is_incomplete() {
    let body = numbered_subtask("SSH0001-1").replacen(
        "{{error-handling-subtask}}",
        "**Error Handling**\nTBD",
        1,
    );
    let result = validate(&[main_task("SSH0001", "In Progress", "None", &body)]);

    assert_eq!(kinds(&result), vec![ErrorKind::IncompleteErrorHandling]);
    assert_eq!(result.errors[0].task_id, "SSH0001-1");
    assert_eq!(
        result.errors[0].context["missing_fragments"],
        serde_json::json!([
            "**Task-Specific Approach**",
            "- Error pattern for this task",
            "**Error Reporting**",
            "- Monitoring approach"
        ])
    );
}

#[test]
fn mixed_prefixes_warn_once_without_failing() {
    let result = validate(&[
        main_task("SSH0001", "Planned", "None", ""),
        main_task("DBX0002", "Planned", "None", ""),
    ]);

    assert!(result.valid, "unexpected errors: {:?}", result.errors);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, ErrorKind::MixedPrefixes);
}

#[test]
fn repeated_first_id_still_warns_about_prefixes_once() {
    let result = validate(&[
        main_task("SSH0001", "Planned", "None", ""),
        main_task("SSH0001", "Planned", "None", ""),
        main_task("WEB0101", "Planned", "None", ""),
    ]);
    assert_eq!(result.findings_of(ErrorKind::MixedPrefixes).len(), 1);
}

#[test]
fn duplicate_ids_are_reported_per_occurrence() {
    let result = validate(&[
        main_task("SSH0001", "Planned", "None", ""),
        main_task("SSH0001", "Planned", "None", ""),
    ]);
    assert_eq!(
        kinds(&result),
        vec![ErrorKind::DuplicateTaskId, ErrorKind::DuplicateTaskId]
    );
}

#[test]
fn revalidating_the_same_text_is_identical() {
    let text = document(&[
        main_task("SSH0001", "In Progress", "SSH0009", ""),
        main_task("WEB0150", "Someday", "None", ""),
    ]);
    let config = ValidationConfig::default();
    assert_eq!(
        validate_markdown(&text, &config),
        validate_markdown(&text, &config)
    );
}
