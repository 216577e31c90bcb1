use serde::Serialize;
use std::path::PathBuf;

const LINE_COMMENT: &str = "//";
const BASIC_COMMENT: &str = "'";
const BLOCK_OPEN: &str = "/*";
const BLOCK_CLOSE: &str = "*/";

/// Line counts for one source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineCounts {
    pub total: usize,
    pub comment: usize,
    pub empty: usize,
}

impl LineCounts {
    pub fn add(&mut self, other: LineCounts) {
        self.total += other.total;
        self.comment += other.comment;
        self.empty += other.empty;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLineCount {
    pub file: PathBuf,
    #[serde(flatten)]
    pub counts: LineCounts,
}

/// Classifies every line of `source` as empty, comment or code.
///
/// A line is a comment when, once trimmed, it starts with `//`, `'` or
/// `/*`, or sits inside a `/* */` block opened on an earlier line. Blank
/// lines count as empty even inside a block.
pub fn count_lines(source: &str) -> LineCounts {
    let mut counts = LineCounts::default();
    let mut in_block = false;

    for line in source.lines() {
        counts.total += 1;
        let line = line.trim();

        if line.is_empty() {
            counts.empty += 1;
        } else if let Some(rest) = line.strip_prefix(BLOCK_OPEN) {
            counts.comment += 1;
            in_block = !rest.contains(BLOCK_CLOSE);
        } else if in_block {
            counts.comment += 1;
            in_block = !line.contains(BLOCK_CLOSE);
        } else if line.starts_with(LINE_COMMENT) || line.starts_with(BASIC_COMMENT) {
            counts.comment += 1;
        }
    }

    counts
}
