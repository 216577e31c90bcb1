use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{LabelStats, StatsSummary};
use crate::errors::TaskError;
use crate::xml::{self, XmlElement};

pub const ROOT_ELEMENT: &str = "code-summaries";
pub const SUMMARY_ELEMENT: &str = "code-summary";

/// Identifies the run a `<code-summary>` belongs to.
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub date: String,
    pub build_name: String,
}

/// Writes one `<code-summary>` for this run into `path`. With `append` an
/// existing report keeps its earlier summaries.
pub fn write_summary(
    path: &Path,
    summary: &StatsSummary,
    run: &RunInfo,
    append: bool,
    summarize: bool,
) -> Result<(), TaskError> {
    let fail = |reason: String| TaskError::ReportWrite {
        path: path.to_path_buf(),
        reason,
    };

    let mut root = if append && path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let existing = xml::parse(&content).map_err(|e| fail(format!("cannot append: {e}")))?;
        if existing.name != ROOT_ELEMENT {
            return Err(fail(format!(
                "cannot append: root element is <{}>, expected <{ROOT_ELEMENT}>",
                existing.name
            )));
        }
        existing
    } else {
        XmlElement::new(ROOT_ELEMENT)
    };
    root.push(summary_element(summary, run, summarize));

    let file = File::create(path).map_err(|e| fail(e.to_string()))?;
    let mut out = BufWriter::new(file);
    xml::write_document(&mut out, &root).map_err(fail)?;
    out.flush().map_err(|e| fail(e.to_string()))
}

fn summary_element(summary: &StatsSummary, run: &RunInfo, summarize: bool) -> XmlElement {
    let mut node = XmlElement::new(SUMMARY_ELEMENT)
        .with_attribute("date", run.date.as_str())
        .with_attribute("buildname", run.build_name.as_str());
    for group in &summary.groups {
        node.push(line_count_element(group, summarize));
    }
    node
}

fn line_count_element(group: &LabelStats, summarize: bool) -> XmlElement {
    let mut node = XmlElement::new("linecount")
        .with_attribute("label", group.label.as_str())
        .with_attribute("totalLineCount", group.counts.total.to_string())
        .with_attribute("emptyLineCount", group.counts.empty.to_string())
        .with_attribute("commentLineCount", group.counts.comment.to_string());

    if !summarize {
        let mut files = XmlElement::new("file-summaries");
        for file in &group.files {
            files.push(
                XmlElement::new("file-summary")
                    .with_attribute("name", file.file.display().to_string())
                    .with_attribute("totalLineCount", file.counts.total.to_string())
                    .with_attribute("emptyLineCount", file.counts.empty.to_string())
                    .with_attribute("commentLineCount", file.counts.comment.to_string()),
            );
        }
        node.push(files);
    }
    node
}
