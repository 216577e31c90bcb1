pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "buildtasks",
    version,
    about = "Regex extraction reports and FxCop code analysis for builds"
)]
pub struct Cli {
    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract regex matches from files into an XML report
    Grep {
        /// Input files (added to those from the config file)
        files: Vec<PathBuf>,

        /// Regular expression; named groups become match fields
        #[arg(short, long)]
        pattern: Option<String>,

        /// Report file to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Glob of additional inputs under --root (repeatable)
        #[arg(short, long)]
        include: Vec<String>,

        /// Directory that --include globs and config input_files resolve under
        /// (FILES stay relative to the working directory)
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Match a pattern once and print the resulting item and its metadata
    Item {
        /// Regular expression; named groups become metadata
        #[arg(short, long)]
        pattern: String,

        /// Text to match
        input: String,

        /// Print the item as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count total, comment and empty lines per label
    Stats {
        /// Input files (added to the config groups under --label)
        files: Vec<PathBuf>,

        /// Label for FILES and --include matches
        #[arg(short, long, default_value = crate::stats::DEFAULT_LABEL)]
        label: String,

        /// Glob of additional inputs under --root (repeatable)
        #[arg(short, long)]
        include: Vec<String>,

        /// Directory that --include globs and config groups resolve under
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// XML report to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Add this run to an existing report
        #[arg(long)]
        append: bool,

        /// Build identifier recorded with the run
        #[arg(long)]
        build_name: Option<String>,

        /// Report label totals only
        #[arg(long)]
        summarize: bool,

        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run FxCopCmd over assemblies and report its findings
    Fxcop {
        /// Assemblies to analyze (replace those from the config file)
        assemblies: Vec<PathBuf>,

        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Keep the analysis report at this path
        #[arg(long)]
        out: Option<PathBuf>,

        /// FxCop install directory
        #[arg(long)]
        tool_path: Option<PathBuf>,

        /// Fail on any finding, not only build-breaking ones
        #[arg(long)]
        treat_warnings_as_errors: bool,
    },
    /// Create a default .buildtasksrc.toml
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Github,
}
