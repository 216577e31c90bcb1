//! Line statistics for labelled groups of source files.

pub mod counter;
pub mod report;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use counter::{count_lines, FileLineCount, LineCounts};
pub use report::RunInfo;

use crate::errors::TaskError;
use crate::grep::{read_source, scanner, under_root};

pub const DEFAULT_LABEL: &str = "Source Code";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub output_file: Option<PathBuf>,
    pub build_name: Option<String>,
    /// Add this run's summary to an existing report instead of replacing it.
    pub append: bool,
    /// Leave per-file entries out of the report.
    pub summarize: bool,
    pub groups: Vec<StatsGroup>,
}

/// Files counted under one label. Relative paths and globs resolve under
/// the working root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsGroup {
    pub label: Option<String>,
    pub input_files: Vec<PathBuf>,
    pub include: Vec<String>,
    pub ignore: Vec<String>,
}

/// Resolved inputs for a single run.
#[derive(Debug, Clone, Default)]
pub struct StatsTask {
    pub output_file: Option<PathBuf>,
    pub build_name: String,
    pub append: bool,
    pub summarize: bool,
    /// Label and files, in first-seen label order.
    pub groups: Vec<(String, Vec<PathBuf>)>,
}

impl StatsTask {
    pub fn from_config(config: &StatsConfig, root: &Path) -> Self {
        let mut task = StatsTask {
            output_file: config.output_file.clone(),
            build_name: config.build_name.clone().unwrap_or_default(),
            append: config.append,
            summarize: config.summarize,
            groups: Vec::new(),
        };
        for group in &config.groups {
            let mut files: Vec<_> = group
                .input_files
                .iter()
                .map(|path| under_root(root, path))
                .collect();
            files.extend(scanner::scan(root, &group.include, &group.ignore));
            let label = group.label.as_deref().unwrap_or(DEFAULT_LABEL);
            task.add_files(label, files);
        }
        task
    }

    /// Adds `files` under `label`, merging with an earlier group of the
    /// same label.
    pub fn add_files(&mut self, label: &str, files: Vec<PathBuf>) {
        match self.groups.iter_mut().find(|(l, _)| l == label) {
            Some((_, existing)) => existing.extend(files),
            None => self.groups.push((label.to_string(), files)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelStats {
    pub label: String,
    #[serde(flatten)]
    pub counts: LineCounts,
    pub files: Vec<FileLineCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub groups: Vec<LabelStats>,
}

/// Counts every group and, when an output file is set, records the run in
/// the report. Any unreadable input aborts before the report is touched.
pub fn run(task: &StatsTask) -> Result<StatsSummary, TaskError> {
    let mut summary = StatsSummary::default();

    for (label, files) in &task.groups {
        let mut group = LabelStats {
            label: label.clone(),
            counts: LineCounts::default(),
            files: Vec::with_capacity(files.len()),
        };
        for path in files {
            let counts = count_lines(&read_source(path)?);
            if !task.summarize {
                tracing::info!(
                    file = %path.display(),
                    total = counts.total,
                    comment = counts.comment,
                    empty = counts.empty,
                    "counted"
                );
            }
            group.counts.add(counts);
            group.files.push(FileLineCount {
                file: path.clone(),
                counts,
            });
        }
        tracing::info!(
            label = %group.label,
            total = group.counts.total,
            comment = group.counts.comment,
            empty = group.counts.empty,
            "label totals"
        );
        summary.groups.push(group);
    }

    if let Some(output) = &task.output_file {
        let run_info = RunInfo {
            date: chrono::Local::now().to_rfc3339(),
            build_name: task.build_name.clone(),
        };
        report::write_summary(output, &summary, &run_info, task.append, task.summarize)?;
        tracing::debug!(output = %output.display(), "wrote code statistics");
    }

    Ok(summary)
}
