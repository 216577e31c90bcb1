pub mod github;
pub mod json;
pub mod text;

use std::path::Path;

use crate::cli::OutputFormat;
use crate::fxcop::FxCopOutcome;
use crate::types::Diagnostic;

pub fn render(outcome: &FxCopOutcome, project_root: &Path, format: OutputFormat) {
    match format {
        OutputFormat::Text => text::render(outcome, project_root),
        OutputFormat::Json => json::render(outcome, project_root),
        OutputFormat::Github => github::render(outcome, project_root),
    }
}

/// Path relative to `project_root`, or `None` when the finding has no
/// source location.
fn relative_path(d: &Diagnostic, project_root: &Path) -> Option<String> {
    d.has_location().then(|| {
        d.file
            .strip_prefix(project_root)
            .unwrap_or(&d.file)
            .display()
            .to_string()
    })
}
