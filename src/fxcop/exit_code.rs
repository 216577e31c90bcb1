//! FxCopCmd exit codes are bit masks. Only a few bits end the run.

pub const OUTPUT_ERROR: i32 = 0x40;
pub const COMMAND_LINE_SWITCH_ERROR: i32 = 0x80;
pub const ASSEMBLY_REFERENCES_ERROR: i32 = 0x200;
pub const UNKNOWN_ERROR: i32 = 0x100_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitFailure {
    /// The tool could not write its report.
    Output,
    CommandLineSwitch,
    AssemblyReferences,
    Unknown,
}

impl ExitFailure {
    pub fn code(self) -> &'static str {
        match self {
            ExitFailure::Output => "CA0501",
            ExitFailure::CommandLineSwitch => "CA0059",
            ExitFailure::AssemblyReferences => "CA0058",
            ExitFailure::Unknown => "CA0001",
        }
    }
}

impl std::fmt::Display for ExitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExitFailure::Output => "An error occurred while writing the code analysis report",
            ExitFailure::CommandLineSwitch => "Code analysis was given an invalid command-line switch",
            ExitFailure::AssemblyReferences => {
                "One or more referenced assemblies could not be found"
            }
            ExitFailure::Unknown => "Code analysis failed with an unknown error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// Findings in the report decide the outcome.
    NonFatal,
    Fatal(ExitFailure),
}

/// Classifies a non-zero exit code. Bits are tested in a fixed priority
/// order; the first hit wins even when several are set.
pub fn classify(code: i32, treat_warnings_as_errors: bool) -> ExitClass {
    if code & OUTPUT_ERROR == OUTPUT_ERROR {
        ExitClass::Fatal(ExitFailure::Output)
    } else if code & COMMAND_LINE_SWITCH_ERROR == COMMAND_LINE_SWITCH_ERROR {
        ExitClass::Fatal(ExitFailure::CommandLineSwitch)
    } else if code == ASSEMBLY_REFERENCES_ERROR {
        if treat_warnings_as_errors {
            ExitClass::Fatal(ExitFailure::AssemblyReferences)
        } else {
            ExitClass::NonFatal
        }
    } else if code & UNKNOWN_ERROR == UNKNOWN_ERROR {
        ExitClass::Fatal(ExitFailure::Unknown)
    } else {
        ExitClass::NonFatal
    }
}
