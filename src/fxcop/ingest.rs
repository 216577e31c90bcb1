use std::path::{Path, PathBuf};

use super::code_item::{self, AncestorRef};
use crate::types::{Diagnostic, Severity};
use crate::xml::XmlElement;

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    pub treat_warnings_as_errors: bool,
    /// Forward findings from `Message` nodes; they are tallied either way.
    pub output_to_build_log: bool,
}

/// Diagnostics forwarded to the build log plus tallies of everything seen.
#[derive(Debug, Default)]
pub struct Findings {
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
    pub warnings: usize,
}

impl Findings {
    pub fn record(&mut self, diagnostic: Diagnostic, forward: bool) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        if !forward {
            tracing::debug!(keyword = %diagnostic.keyword, "not forwarded: {}", diagnostic.message);
            return;
        }
        match diagnostic.severity {
            Severity::Error => tracing::error!(
                keyword = %diagnostic.keyword,
                file = %diagnostic.file.display(),
                line = diagnostic.line,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => tracing::warn!(
                keyword = %diagnostic.keyword,
                file = %diagnostic.file.display(),
                line = diagnostic.line,
                "{}",
                diagnostic.message
            ),
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Re-emits every `Exception` and active `Message` of a parsed report.
/// Returns `false` when any node was fatal.
pub fn ingest(report: &XmlElement, options: IngestOptions, findings: &mut Findings) -> bool {
    let mut ok = true;

    for exception in report.descendants("Exception") {
        ok &= log_exception(exception, options, findings);
    }

    let mut messages = Vec::new();
    report.walk(&mut |element, ancestors| {
        if !ancestors.is_empty() && element.name == "Message" && element.attr("Status") == "Active"
        {
            messages.push((element, ancestors.to_vec()));
        }
    });
    for (message, ancestors) in messages {
        ok &= log_message(message, &ancestors, options, findings);
    }

    ok
}

fn log_exception(exception: &XmlElement, options: IngestOptions, findings: &mut Findings) -> bool {
    let keyword = exception.attr("Keyword");
    let text = exception
        .child("ExceptionMessage")
        .map(XmlElement::inner_text)
        .unwrap_or_default();

    let message = match exception.attribute("CheckId") {
        Some(check_id) => format!(
            "{keyword} : rule {}#{check_id} failed while analyzing {}: {text}",
            exception.attr("Category"),
            exception.attr("Target"),
        ),
        None => format!("{keyword} : {text}"),
    };

    let as_warning = !options.treat_warnings_as_errors
        && exception
            .attribute("TreatAsWarning")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
    let severity = if as_warning {
        Severity::Warning
    } else {
        Severity::Error
    };

    findings.record(Diagnostic::engine(severity, message, keyword), true);
    as_warning
}

fn log_message(
    message: &XmlElement,
    ancestors: &[&XmlElement],
    options: IngestOptions,
    findings: &mut Findings,
) -> bool {
    let check_id = message.attribute("CheckId").filter(|s| !s.is_empty());
    let category = message.attribute("Category").filter(|s| !s.is_empty());
    let severity = if options.treat_warnings_as_errors || message.attr("BreaksBuild") == "True" {
        Severity::Error
    } else {
        Severity::Warning
    };

    let issues = message.descendants("Issue");
    for (i, issue) in issues.iter().enumerate() {
        let (file, line) = location(issue);
        let code_item = if i == 0 {
            code_item_fragment(message, ancestors)
        } else {
            None
        };
        let diagnostic = Diagnostic {
            severity,
            subcategory: category.map(str::to_string),
            check_id: check_id.map(str::to_string),
            file,
            line,
            message: issue.inner_text(),
            keyword: check_id.unwrap_or_default().to_string(),
            code_item,
        };
        findings.record(diagnostic, options.output_to_build_log);
    }

    // BreaksBuild only counts once an issue is reported
    severity == Severity::Warning || (issues.is_empty() && !options.treat_warnings_as_errors)
}

/// Source location of an issue, only when `Path`, `File` and `Line` are all
/// present and the line parses.
fn location(issue: &XmlElement) -> (PathBuf, i64) {
    let (dir, file, line) = (issue.attr("Path"), issue.attr("File"), issue.attr("Line"));
    if dir.is_empty() || file.is_empty() || line.is_empty() {
        return (PathBuf::new(), -1);
    }
    match line.trim().parse::<i64>() {
        Ok(line) => (Path::new(dir).join(file), line),
        Err(_) => (PathBuf::new(), -1),
    }
}

fn code_item_fragment(message: &XmlElement, ancestors: &[&XmlElement]) -> Option<String> {
    let chain: Vec<_> = ancestors.iter().map(|a| AncestorRef::of(a)).collect();
    let mut annotated = message.clone();
    annotated.push(code_item::build(&chain));
    match annotated.to_xml_string() {
        Ok(xml) => Some(xml),
        Err(e) => {
            tracing::warn!("could not serialize code item: {e}");
            None
        }
    }
}
