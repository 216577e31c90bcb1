//! Regex extraction over a set of files into an XML report.

pub mod item;
pub mod line_counter;
pub mod matches;
pub mod pattern;
pub mod report;
pub mod scanner;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use item::{create_item, CreatedItem};
pub use line_counter::LineCounter;
pub use matches::{MatchCollection, MatchRecord};
pub use pattern::Pattern;

use crate::errors::TaskError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GrepConfig {
    pub pattern: Option<String>,
    pub output_file: Option<PathBuf>,
    /// Relative paths resolve under the working root, like `include`.
    pub input_files: Vec<PathBuf>,
    /// Globs expanded under the working root and appended to `input_files`.
    pub include: Vec<String>,
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepSummary {
    pub files: usize,
    pub matches: usize,
    pub output_file: PathBuf,
}

/// Resolved inputs for a single run.
#[derive(Debug, Clone)]
pub struct GrepTask {
    pub pattern: String,
    pub output_file: PathBuf,
    pub input_files: Vec<PathBuf>,
}

impl GrepTask {
    /// Merges config with the include globs expanded under `root`.
    pub fn from_config(config: &GrepConfig, root: &Path) -> anyhow::Result<Self> {
        let pattern = config
            .pattern
            .clone()
            .ok_or_else(|| anyhow::anyhow!("grep: a pattern is required"))?;
        let output_file = config
            .output_file
            .clone()
            .ok_or_else(|| anyhow::anyhow!("grep: an output file is required"))?;

        let mut input_files: Vec<_> = config
            .input_files
            .iter()
            .map(|path| under_root(root, path))
            .collect();
        input_files.extend(scanner::scan(root, &config.include, &config.ignore));

        Ok(Self {
            pattern,
            output_file,
            input_files,
        })
    }
}

/// Extracts every match from every input and writes one report.
///
/// Any input that cannot be read aborts the run before the report is
/// written.
pub fn run(task: &GrepTask) -> Result<GrepSummary, TaskError> {
    let pattern = Pattern::new(&task.pattern)?;
    tracing::info!(output = %task.output_file.display(), "writing matches");

    let mut matches = MatchCollection::default();
    for path in &task.input_files {
        let content = read_source(path)?;
        let found = pattern.extract(path, &content);
        tracing::debug!(file = %path.display(), matches = found.len(), "scanned");
        matches.append(found);
    }

    report::write_matches(&task.output_file, &matches)?;
    tracing::info!(
        files = task.input_files.len(),
        matches = matches.len(),
        "grep complete"
    );

    Ok(GrepSummary {
        files: task.input_files.len(),
        matches: matches.len(),
        output_file: task.output_file.clone(),
    })
}

pub(crate) fn under_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || root.as_os_str().is_empty() || root == Path::new(".") {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String, TaskError> {
    let bytes = std::fs::read(path).map_err(|e| TaskError::read(path.to_path_buf(), e))?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
