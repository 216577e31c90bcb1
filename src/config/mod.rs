use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::fxcop::FxCopConfig;
use crate::grep::GrepConfig;
use crate::stats::StatsConfig;

pub const CONFIG_FILE: &str = ".buildtasksrc.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub format: OutputFormat,
    pub grep: GrepConfig,
    pub fxcop: FxCopConfig,
    pub stats: StatsConfig,
}

impl Config {
    /// Loads `config_path`, or `.buildtasksrc.toml` under `project_root`
    /// when present, or the defaults.
    pub fn load(config_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let path = config_path.map(Path::to_path_buf).or_else(|| {
            let default = project_root.join(CONFIG_FILE);
            default.exists().then_some(default)
        });

        match path {
            Some(path) => {
                tracing::debug!(config = %path.display(), "loading config");
                let content = std::fs::read_to_string(&path)?;
                toml::from_str(&content).map_err(|e| anyhow::anyhow!("Config parse error: {e}"))
            }
            None => Ok(Config::default()),
        }
    }

    pub const fn default_toml() -> &'static str {
        r#"# buildtasks configuration

# Output format for code analysis diagnostics: "text", "json" or "github"
format = "text"

[grep]
# Regular expression; named groups become fields of each match.
# pattern = "(?P<Todo>TODO.*)"
# output_file = "todos.xml"

# Explicit inputs and globs, both resolved under the working directory
# input_files = ["src/Program.cs"]
include = []
ignore = [".git", "bin", "obj"]

[fxcop]
# Assemblies to analyze
# assemblies = ["bin/Release/App.dll"]

# Keep the report here instead of a temporary file
# log_file = "CodeAnalysisLog.xml"

# Tool install directory; discovered from FXCOP_PATH, Program Files or PATH when unset
# tool_path = "C:/Program Files/Microsoft FxCop 1.36"

# Rule assemblies or directories; <tool dir>/Rules when unset
# rule_assemblies = ["Rules/DesignRules.dll"]
# rules = ["-Microsoft.Design#CA1020"]

treat_warnings_as_errors = false
output_to_build_log = true
analysis_timeout = 120
search_global_assembly_cache = false
ignore_generated_code = false

[stats]
# Line statistics report; counts are only logged when unset
# output_file = "codestats.xml"
# build_name = "nightly"
append = false
summarize = false

# One table per label; files of a repeated label are merged
# [[stats.groups]]
# label = "C#"
# include = ["**/*.cs"]
"#
    }
}
