//! Task errors. Every variant carries a short code for cross-referencing.

use std::path::PathBuf;

use crate::fxcop::exit_code::ExitFailure;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Pattern '{pattern}' does not match '{input}'")]
    NoMatch { pattern: String, input: String },

    #[error("Failed to write report {}: {reason}", path.display())]
    ReportWrite { path: PathBuf, reason: String },

    #[error("Failed to read report {}: {reason}", path.display())]
    ReportParse { path: PathBuf, reason: String },

    #[error("{kind}")]
    ProcessExit { kind: ExitFailure },

    #[error("Code analysis reported {errors} error(s)")]
    NodeLevelFatal { errors: usize },

    #[error("Unable to locate {tool}; set tool_path or FXCOP_PATH")]
    ToolNotFound { tool: String },

    #[error("Failed to launch {}: {source}", program.display())]
    ToolLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TaskError {
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::InputNotFound { .. } => "BT0001",
            TaskError::InputRead { .. } => "BT0002",
            TaskError::Pattern(_) => "BT0003",
            TaskError::ReportWrite { .. } => "BT0004",
            TaskError::ReportParse { .. } => "CA0501",
            TaskError::ProcessExit { kind } => kind.code(),
            TaskError::NodeLevelFatal { .. } => "BT0005",
            TaskError::ToolNotFound { .. } => "BT0006",
            TaskError::ToolLaunch { .. } => "BT0007",
            TaskError::NoMatch { .. } => "BT0008",
        }
    }

    pub(crate) fn read(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            TaskError::InputNotFound { path }
        } else {
            TaskError::InputRead { path, source }
        }
    }
}
