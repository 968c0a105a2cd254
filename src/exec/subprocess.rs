//! Subprocess execution
//!
//! Child processes inherit the parent's stdin, stdout and stderr and are
//! awaited to completion. There is no timeout: a hung cmake blocks the run.

use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::build::cmake::CommandLine;

/// Outcome of a finished child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code, `None` if terminated by a signal
    pub exit_code: Option<i32>,

    /// Execution duration
    pub duration: Duration,
}

impl ProcessOutcome {
    /// Create a ProcessOutcome from an exit status
    pub fn from_status(status: ExitStatus, duration: Duration) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code(),
            duration,
        }
    }
}

/// Runs external commands on behalf of the runner
pub trait ProcessExecutor {
    /// Run `command` to completion; `Err` only when it could not be started
    fn execute(&self, command: &CommandLine) -> Result<ProcessOutcome>;
}

/// Executes commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn execute(&self, command: &CommandLine) -> Result<ProcessOutcome> {
        let start = Instant::now();

        let status = Command::new(command.program())
            .args(command.get_args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute {}", command.program().display()))?;

        Ok(ProcessOutcome::from_status(status, start.elapsed()))
    }
}

/// Check if a command exists in PATH (or is an existing file path)
pub fn command_exists(program: &std::path::Path) -> bool {
    which::which(program).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_spawn_error() {
        let command = CommandLine::new("buildmatrix-definitely-not-a-program").arg("--version");
        let err = SystemExecutor.execute(&command).unwrap_err();
        assert!(format!("{:#}", err).contains("buildmatrix-definitely-not-a-program"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_codes() {
        let ok = SystemExecutor.execute(&CommandLine::new("true")).unwrap();
        assert!(ok.success);
        assert_eq!(ok.exit_code, Some(0));

        let failed = SystemExecutor
            .execute(&CommandLine::new("sh").arg("-c").arg("exit 3"))
            .unwrap();
        assert!(!failed.success);
        assert_eq!(failed.exit_code, Some(3));
    }

    #[test]
    fn test_command_exists() {
        assert!(!command_exists(std::path::Path::new(
            "buildmatrix-definitely-not-a-program"
        )));
    }
}
