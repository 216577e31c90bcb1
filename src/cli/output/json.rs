use serde::Serialize;
use std::path::Path;

use crate::fxcop::FxCopOutcome;
use crate::types::Severity;

#[derive(Serialize)]
struct JsonOutput<'a> {
    diagnostics: Vec<JsonDiagnostic<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    file: Option<String>,
    line: Option<i64>,
    severity: &'a Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    check_id: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_item: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonSummary {
    success: bool,
    errors: usize,
    warnings: usize,
    exit_code: i32,
}

fn build_output<'a>(outcome: &'a FxCopOutcome, project_root: &Path) -> JsonOutput<'a> {
    let diagnostics = outcome
        .diagnostics
        .iter()
        .map(|d| JsonDiagnostic {
            file: super::relative_path(d, project_root),
            line: d.has_location().then_some(d.line),
            severity: &d.severity,
            category: d.subcategory.as_deref(),
            check_id: d.label(),
            message: &d.message,
            code_item: d.code_item.as_deref(),
        })
        .collect();

    JsonOutput {
        diagnostics,
        summary: JsonSummary {
            success: outcome.success,
            errors: outcome.errors,
            warnings: outcome.warnings,
            exit_code: outcome.exit_code,
        },
    }
}

pub fn render(outcome: &FxCopOutcome, project_root: &Path) {
    let output = build_output(outcome, project_root);
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("could not serialize diagnostics: {e}"),
    }
}
