use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TOOL_NAME: &str = "FxCopCmd.exe";
pub const DEFAULT_ANALYSIS_TIMEOUT: u32 = 120;
/// en-US
pub const DEFAULT_OUTPUT_CULTURE: u32 = 1033;
pub const SUCCESS_FILE_SUFFIX: &str = ".lastcodeanalysissucceeded";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FxCopConfig {
    pub assemblies: Vec<PathBuf>,
    pub project: Option<PathBuf>,
    /// Report path. A temporary file is used (and removed) when unset.
    pub log_file: Option<PathBuf>,
    pub rule_assemblies: Option<Vec<PathBuf>>,
    pub rules: Vec<String>,
    pub dictionaries: Vec<PathBuf>,
    pub imports: Vec<PathBuf>,
    pub dependent_assembly_paths: Vec<PathBuf>,
    pub references: Vec<PathBuf>,
    pub platform_path: Option<PathBuf>,
    pub log_file_xsl: Option<PathBuf>,
    pub console_xsl: Option<PathBuf>,
    pub culture: Option<String>,
    pub output_culture: u32,
    pub apply_log_file_xsl: bool,
    pub update_project: bool,
    pub output_to_console: bool,
    pub output_to_build_log: bool,
    pub summary: bool,
    pub quiet: bool,
    pub search_global_assembly_cache: bool,
    pub ignore_invalid_targets: bool,
    pub force_output: bool,
    pub generate_success_file: bool,
    pub ignore_generated_code: bool,
    pub override_rule_visibilities: bool,
    pub treat_warnings_as_errors: bool,
    pub analysis_timeout: u32,
    pub save_messages_to_report: Option<String>,
    pub success_file: Option<PathBuf>,
    pub tool_path: Option<PathBuf>,
    pub tool_name: String,
    pub use_response_file: bool,
}

impl Default for FxCopConfig {
    fn default() -> Self {
        Self {
            assemblies: Vec::new(),
            project: None,
            log_file: None,
            rule_assemblies: None,
            rules: Vec::new(),
            dictionaries: Vec::new(),
            imports: Vec::new(),
            dependent_assembly_paths: Vec::new(),
            references: Vec::new(),
            platform_path: None,
            log_file_xsl: None,
            console_xsl: None,
            culture: None,
            output_culture: DEFAULT_OUTPUT_CULTURE,
            apply_log_file_xsl: false,
            update_project: false,
            output_to_console: false,
            output_to_build_log: true,
            summary: false,
            quiet: false,
            search_global_assembly_cache: false,
            ignore_invalid_targets: false,
            force_output: false,
            generate_success_file: false,
            ignore_generated_code: false,
            override_rule_visibilities: false,
            treat_warnings_as_errors: false,
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT,
            save_messages_to_report: None,
            success_file: None,
            tool_path: None,
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            use_response_file: true,
        }
    }
}

impl FxCopConfig {
    /// Explicit success file, or `<report dir>/<assembly file name>` plus
    /// the success suffix when exactly one assembly is analyzed.
    pub fn success_file_for(&self, report: &Path) -> Option<PathBuf> {
        if let Some(explicit) = &self.success_file {
            return Some(explicit.clone());
        }
        let [assembly] = self.assemblies.as_slice() else {
            return None;
        };
        let mut name = assembly.file_name()?.to_os_string();
        name.push(SUCCESS_FILE_SUFFIX);
        let dir = report.parent().unwrap_or_else(|| Path::new(""));
        Some(dir.join(name))
    }
}
