use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A finding forwarded to the build log.
///
/// `file` is empty and `line` is `-1` when the tool did not report a
/// complete source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub subcategory: Option<String>,
    pub check_id: Option<String>,
    pub file: PathBuf,
    pub line: i64,
    pub message: String,
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_item: Option<String>,
}

impl Diagnostic {
    /// A diagnostic raised by the adapter itself rather than by a finding.
    pub fn engine(severity: Severity, message: impl Into<String>, keyword: &str) -> Self {
        Self {
            severity,
            subcategory: None,
            check_id: None,
            file: PathBuf::new(),
            line: -1,
            message: message.into(),
            keyword: keyword.to_string(),
            code_item: None,
        }
    }

    pub fn has_location(&self) -> bool {
        !self.file.as_os_str().is_empty() && self.line >= 0
    }

    /// Check id when present, otherwise the help keyword.
    pub fn label(&self) -> &str {
        self.check_id.as_deref().unwrap_or(&self.keyword)
    }
}
