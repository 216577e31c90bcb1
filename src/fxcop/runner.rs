use std::io;
use std::path::Path;
use std::process::Command;

use super::exit_code::UNKNOWN_ERROR;

/// Launches an external tool and waits for its exit code.
pub trait ToolRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<i32>;
}

/// Runs the tool as a child process, inheriting stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<i32> {
        let status = Command::new(program).args(args).status()?;
        // killed by a signal
        Ok(status.code().unwrap_or(UNKNOWN_ERROR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_an_io_error() {
        let err = SystemRunner
            .run(Path::new("definitely-not-a-real-tool-xyz"), &[])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_is_returned() {
        let args = vec!["-c".to_string(), "exit 3".to_string()];
        assert_eq!(SystemRunner.run(Path::new("sh"), &args).unwrap(), 3);
    }
}
