use std::path::Path;

use crate::fxcop::FxCopOutcome;
use crate::types::{Diagnostic, Severity};

pub fn render(outcome: &FxCopOutcome, project_root: &Path) {
    for d in &outcome.diagnostics {
        println!("{}", annotation(d, project_root));
    }
}

fn annotation(d: &Diagnostic, project_root: &Path) -> String {
    let level = match d.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    let title = d.label();
    match super::relative_path(d, project_root) {
        Some(rel) => format!(
            "::{level} file={rel},line={line},title={title}::{message}",
            line = d.line,
            message = escape(&d.message),
        ),
        None => format!("::{level} title={title}::{}", escape(&d.message)),
    }
}

/// Workflow commands end at a newline.
fn escape(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
