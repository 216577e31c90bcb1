//! Runs FxCopCmd and turns its XML report into build diagnostics.

pub mod code_item;
pub mod command;
pub mod config;
pub mod exit_code;
pub mod ingest;
pub mod runner;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempPath;

pub use config::FxCopConfig;
pub use exit_code::{ExitClass, ExitFailure};
pub use ingest::{Findings, IngestOptions};
pub use runner::{SystemRunner, ToolRunner};

use crate::errors::TaskError;
use crate::tools::{self, ToolLocator};
use crate::types::{Diagnostic, Severity};
use crate::xml;

#[derive(Debug, Clone, Serialize)]
pub struct FxCopOutcome {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
    pub warnings: usize,
    pub exit_code: i32,
    #[serde(skip)]
    pub fatal: Option<ExitFailure>,
    #[serde(skip)]
    pub report_error: Option<String>,
    pub report: PathBuf,
    pub files_written: Vec<PathBuf>,
}

impl FxCopOutcome {
    pub fn ensure_success(&self) -> Result<(), TaskError> {
        if self.success {
            return Ok(());
        }
        if let Some(kind) = self.fatal {
            return Err(TaskError::ProcessExit { kind });
        }
        if let Some(reason) = &self.report_error {
            return Err(TaskError::ReportParse {
                path: self.report.clone(),
                reason: reason.clone(),
            });
        }
        Err(TaskError::NodeLevelFatal {
            errors: self.errors,
        })
    }
}

/// Report path for one run. A temporary report is removed when dropped.
enum ReportFile {
    Kept(PathBuf),
    Temp(TempPath),
}

impl ReportFile {
    fn path(&self) -> &Path {
        match self {
            ReportFile::Kept(path) => path.as_path(),
            ReportFile::Temp(temp) => &**temp,
        }
    }
}

pub fn run(
    config: &FxCopConfig,
    locator: &ToolLocator,
    runner: &dyn ToolRunner,
) -> Result<FxCopOutcome, TaskError> {
    let tool_dir = match &config.tool_path {
        Some(dir) => dir.clone(),
        None => locator
            .locate(tools::FXCOP)
            .ok_or_else(|| TaskError::ToolNotFound {
                tool: config.tool_name.clone(),
            })?,
    };
    let program = tool_dir.join(&config.tool_name);
    if !program.is_file() {
        return Err(TaskError::ToolNotFound {
            tool: program.display().to_string(),
        });
    }
    tracing::info!(tool = %program.display(), "running code analysis");

    let report = match &config.log_file {
        Some(path) => ReportFile::Kept(path.clone()),
        None => ReportFile::Temp(temp_path(".xml")?),
    };
    let report_path = report.path().to_path_buf();

    let arguments = command::build_arguments(config, &report_path, &tool_dir);
    tracing::debug!(?arguments, "arguments");

    // the response file lives until the tool exits
    let (args, _response_file) = if config.use_response_file {
        let rsp = write_response_file(&arguments)?;
        (vec![format!("@{}", command::quote(&rsp))], Some(rsp))
    } else {
        (arguments, None)
    };

    let exit_code = runner
        .run(&program, &args)
        .map_err(|source| TaskError::ToolLaunch {
            program: program.clone(),
            source,
        })?;
    tracing::debug!(exit_code, "tool exited");

    let options = IngestOptions {
        treat_warnings_as_errors: config.treat_warnings_as_errors,
        output_to_build_log: config.output_to_build_log,
    };
    let mut findings = Findings::default();

    let fatal = match exit_code {
        0 => None,
        code => match exit_code::classify(code, config.treat_warnings_as_errors) {
            ExitClass::Fatal(kind) => Some(kind),
            ExitClass::NonFatal => None,
        },
    };

    let mut nodes_ok = true;
    let mut report_error = None;
    match fatal {
        Some(kind) => {
            findings.record(
                Diagnostic::engine(Severity::Error, kind.to_string(), kind.code()),
                true,
            );
        }
        None => match read_report(&report_path) {
            Ok(Some(root)) => nodes_ok = ingest::ingest(&root, options, &mut findings),
            Ok(None) => tracing::debug!("no report produced"),
            Err(reason) => {
                findings.record(
                    Diagnostic::engine(
                        Severity::Error,
                        format!("Code analysis report is unreadable: {reason}"),
                        ExitFailure::Output.code(),
                    ),
                    true,
                );
                report_error = Some(reason);
            }
        },
    }

    tracing::info!(
        errors = findings.errors,
        warnings = findings.warnings,
        "analysis complete"
    );

    let success_file = config.success_file_for(&report_path);
    let mut files_written = Vec::new();
    match &report {
        ReportFile::Temp(_) => {
            if let Some(file) = success_file.filter(|f| f.exists()) {
                if let Err(e) = fs::remove_file(&file) {
                    tracing::warn!(file = %file.display(), "could not remove success file: {e}");
                }
            }
        }
        ReportFile::Kept(path) => {
            files_written.extend(
                std::iter::once(path.clone())
                    .chain(success_file)
                    .filter(|f| f.exists()),
            );
        }
    }

    Ok(FxCopOutcome {
        success: fatal.is_none() && nodes_ok && report_error.is_none(),
        diagnostics: findings.diagnostics,
        errors: findings.errors,
        warnings: findings.warnings,
        exit_code,
        fatal,
        report_error,
        report: report_path,
        files_written,
    })
}

fn temp_path(suffix: &str) -> Result<TempPath, TaskError> {
    tempfile::Builder::new()
        .prefix("fxcop-")
        .suffix(suffix)
        .tempfile()
        .map(|file| file.into_temp_path())
        .map_err(|e| TaskError::ReportWrite {
            path: std::env::temp_dir(),
            reason: e.to_string(),
        })
}

fn write_response_file(arguments: &[String]) -> Result<TempPath, TaskError> {
    let rsp = temp_path(".rsp")?;
    let write = || -> std::io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(&rsp)?);
        for arg in arguments {
            writeln!(out, "{arg}")?;
        }
        out.flush()
    };
    write().map_err(|e| TaskError::ReportWrite {
        path: rsp.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(rsp)
}

/// Parsed report, or `None` when the tool wrote nothing.
fn read_report(path: &Path) -> Result<Option<xml::XmlElement>, String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let text = String::from_utf8_lossy(bytes);
    xml::parse(&text).map(Some).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const REPORT: &str = indoc! {r#"
        <?xml version="1.0" encoding="utf-8"?>
        <FxCopReport Version="1.36">
          <Targets>
            <Target Name="App.dll">
              <Messages>
                <Message CheckId="CA1822" Category="Microsoft.Performance" Status="Active">
                  <Issue Path="src" File="A.cs" Line="7">Mark as static.</Issue>
                </Message>
              </Messages>
            </Target>
          </Targets>
        </FxCopReport>
    "#};

    const BREAKING_REPORT: &str = indoc! {r#"
        <FxCopReport>
          <Messages>
            <Message CheckId="CA2000" Status="Active" BreaksBuild="True">
              <Issue>Dispose objects.</Issue>
            </Message>
          </Messages>
        </FxCopReport>
    "#};

    /// Writes `report` to the `/out:` path and exits with `code`.
    struct FakeRunner {
        report: Option<&'static str>,
        code: i32,
        calls: RefCell<Vec<Vec<String>>>,
        response: RefCell<Option<String>>,
    }

    impl FakeRunner {
        fn new(report: Option<&'static str>, code: i32) -> Self {
            Self {
                report,
                code,
                calls: RefCell::new(Vec::new()),
                response: RefCell::new(None),
            }
        }
    }

    impl ToolRunner for FakeRunner {
        fn run(&self, _program: &Path, args: &[String]) -> std::io::Result<i32> {
            self.calls.borrow_mut().push(args.to_vec());
            let lines: Vec<String> = match args {
                [single] if single.starts_with('@') => {
                    let rsp = single[1..].trim_matches('"');
                    let content = fs::read_to_string(rsp)?;
                    *self.response.borrow_mut() = Some(content.clone());
                    content.lines().map(str::to_string).collect()
                }
                _ => args.to_vec(),
            };
            if let Some(report) = self.report {
                let out = lines
                    .iter()
                    .find_map(|a| a.strip_prefix("/out:"))
                    .map(|p| p.trim_matches('"').to_string())
                    .unwrap();
                fs::write(out, report)?;
            }
            Ok(self.code)
        }
    }

    struct Setup {
        dir: TempDir,
        config: FxCopConfig,
    }

    fn setup() -> Setup {
        let dir = tempfile::tempdir().unwrap();
        let tool_dir = dir.path().join("fxcop");
        fs::create_dir(&tool_dir).unwrap();
        fs::write(tool_dir.join("FxCopCmd.exe"), "").unwrap();
        let config = FxCopConfig {
            assemblies: vec![PathBuf::from("bin/App.dll")],
            tool_path: Some(tool_dir),
            use_response_file: false,
            ..FxCopConfig::default()
        };
        Setup { dir, config }
    }

    fn run_with(config: &FxCopConfig, runner: &FakeRunner) -> FxCopOutcome {
        run(config, &ToolLocator::new(), runner).unwrap()
    }

    #[test]
    fn test_warnings_succeed() {
        let s = setup();
        let outcome = run_with(&s.config, &FakeRunner::new(Some(REPORT), 0));
        assert!(outcome.success);
        assert_eq!(outcome.warnings, 1);
        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].line, 7);
        assert!(outcome.ensure_success().is_ok());
    }

    #[test]
    fn test_treat_warnings_as_errors_fails() {
        let mut s = setup();
        s.config.treat_warnings_as_errors = true;
        let outcome = run_with(&s.config, &FakeRunner::new(Some(REPORT), 0));
        assert!(!outcome.success);
        assert_eq!(outcome.errors, 1);
        let err = outcome.ensure_success().unwrap_err();
        assert!(matches!(err, TaskError::NodeLevelFatal { errors: 1 }));
        assert_eq!(err.code(), "BT0005");
    }

    #[test]
    fn test_breaks_build_fails() {
        let s = setup();
        let outcome = run_with(&s.config, &FakeRunner::new(Some(BREAKING_REPORT), 0));
        assert!(!outcome.success);
        assert_eq!(outcome.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_fatal_exit_skips_report() {
        let s = setup();
        let runner = FakeRunner::new(Some(BREAKING_REPORT), exit_code::COMMAND_LINE_SWITCH_ERROR);
        let outcome = run_with(&s.config, &runner);
        assert!(!outcome.success);
        assert_eq!(outcome.fatal, Some(ExitFailure::CommandLineSwitch));
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].keyword, "CA0059");
        let err = outcome.ensure_success().unwrap_err();
        assert_eq!(err.code(), "CA0059");
    }

    #[test]
    fn test_assembly_reference_exit_is_not_fatal_by_default() {
        let s = setup();
        let runner = FakeRunner::new(Some(REPORT), exit_code::ASSEMBLY_REFERENCES_ERROR);
        let outcome = run_with(&s.config, &runner);
        assert!(outcome.success);
        assert_eq!(outcome.exit_code, exit_code::ASSEMBLY_REFERENCES_ERROR);
        assert_eq!(outcome.warnings, 1);
    }

    #[test]
    fn test_unreadable_report_is_one_error() {
        let s = setup();
        let outcome = run_with(&s.config, &FakeRunner::new(Some("<FxCopReport><Messages>"), 0));
        assert!(!outcome.success);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].keyword, "CA0501");
        assert!(outcome.report_error.is_some());
        assert!(matches!(
            outcome.ensure_success(),
            Err(TaskError::ReportParse { .. })
        ));
    }

    #[test]
    fn test_missing_report_succeeds_without_findings() {
        let s = setup();
        let outcome = run_with(&s.config, &FakeRunner::new(None, 0));
        assert!(outcome.success);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_temp_report_is_removed() {
        let s = setup();
        let outcome = run_with(&s.config, &FakeRunner::new(Some(REPORT), 0));
        assert!(!outcome.report.exists());
        assert!(outcome.files_written.is_empty());
    }

    #[test]
    fn test_temp_run_removes_success_file() {
        let s = setup();
        let runner = FakeRunner::new(Some(REPORT), 0);
        // the tool drops the success file beside the report
        struct WithSuccess<'a>(&'a FakeRunner);
        impl ToolRunner for WithSuccess<'_> {
            fn run(&self, program: &Path, args: &[String]) -> std::io::Result<i32> {
                let code = self.0.run(program, args)?;
                let out = args
                    .iter()
                    .find_map(|a| a.strip_prefix("/out:"))
                    .map(|p| PathBuf::from(p.trim_matches('"')))
                    .unwrap();
                fs::write(
                    out.with_file_name("App.dll.lastcodeanalysissucceeded"),
                    "",
                )?;
                Ok(code)
            }
        }
        let outcome = run(&s.config, &ToolLocator::new(), &WithSuccess(&runner)).unwrap();
        let success = outcome
            .report
            .with_file_name("App.dll.lastcodeanalysissucceeded");
        assert!(!success.exists());
    }

    #[test]
    fn test_kept_report_lists_files_written() {
        let mut s = setup();
        let log = s.dir.path().join("analysis.xml");
        s.config.log_file = Some(log.clone());
        fs::write(s.dir.path().join("App.dll.lastcodeanalysissucceeded"), "").unwrap();
        let outcome = run_with(&s.config, &FakeRunner::new(Some(REPORT), 0));
        assert!(log.exists());
        assert_eq!(
            outcome.files_written,
            vec![
                log,
                s.dir.path().join("App.dll.lastcodeanalysissucceeded")
            ]
        );
    }

    #[test]
    fn test_response_file_carries_arguments() {
        let mut s = setup();
        s.config.use_response_file = true;
        let runner = FakeRunner::new(Some(REPORT), 0);
        let outcome = run_with(&s.config, &runner);
        assert!(outcome.success);

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].len(), 1);
        assert!(calls[0][0].starts_with("@\""));
        let rsp = calls[0][0][1..].trim_matches('"').to_string();
        assert!(!Path::new(&rsp).exists(), "response file is removed");

        let response = runner.response.borrow();
        let lines: Vec<_> = response.as_deref().unwrap().lines().collect();
        assert_eq!(lines[0], "/outputCulture:1033");
        assert!(lines[1].starts_with("/out:"));
        assert_eq!(*lines.last().unwrap(), "/timeout:120");
    }

    #[test]
    fn test_missing_tool_is_reported() {
        let mut s = setup();
        s.config.tool_name = "Nope.exe".to_string();
        let err = run(&s.config, &ToolLocator::new(), &FakeRunner::new(None, 0)).unwrap_err();
        assert!(matches!(err, TaskError::ToolNotFound { .. }));
    }

    #[test]
    fn test_locator_supplies_tool_dir() {
        let mut s = setup();
        let tool_dir = s.config.tool_path.take().unwrap();
        let mut locator = ToolLocator::new();
        locator.register(tools::FXCOP, move || Some(tool_dir.clone()));
        let outcome = run(&s.config, &locator, &FakeRunner::new(Some(REPORT), 0)).unwrap();
        assert!(outcome.success);

        let err = run(&s.config, &ToolLocator::new(), &FakeRunner::new(None, 0)).unwrap_err();
        assert_eq!(err.code(), "BT0006");
    }

    #[test]
    fn test_launch_failure() {
        struct Broken;
        impl ToolRunner for Broken {
            fn run(&self, _: &Path, _: &[String]) -> std::io::Result<i32> {
                Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
            }
        }
        let s = setup();
        let err = run(&s.config, &ToolLocator::new(), &Broken).unwrap_err();
        assert_eq!(err.code(), "BT0007");
    }
}
