//! External tool invocation.
//!
//! The pipeline never spawns processes directly; it goes through
//! [`ToolRunner`] so tests can substitute a scripted runner.

use std::ffi::OsString;
use std::io;
use std::process::Command;

/// Captured result of one tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code (`None` if the process was killed by a signal).
    pub status: Option<i32>,
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the process exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Failure to start a tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program is not on `PATH`.
    #[error("`{program}` not found")]
    NotFound {
        /// Program name as invoked.
        program: String,
    },
    /// Any other spawn or wait failure.
    #[error("failed to run `{program}`: {source}")]
    Io {
        /// Program name as invoked.
        program: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Capability to run an external program to completion.
///
/// Implementations block until the program exits. A non-zero exit is not an
/// error at this level; it is reported through [`ToolOutput::status`].
pub trait ToolRunner: Send + Sync {
    /// Run `program` with `args` and capture its output.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] if the program cannot be located, and
    /// [`ToolError::Io`] if it cannot be started or waited on.
    fn run(&self, program: &str, args: &[OsString]) -> Result<ToolOutput, ToolError>;
}

/// [`ToolRunner`] backed by real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        tracing::debug!(program, ?args, "Running tool");

        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ToolError::NotFound {
                    program: program.to_owned(),
                }
            } else {
                ToolError::Io {
                    program: program.to_owned(),
                    source: e,
                }
            }
        })?;

        let result = ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(program, status = ?result.status, stdout = %result.stdout, "Tool finished");
        if !result.stderr.is_empty() {
            tracing::debug!(program, stderr = %result.stderr, "Tool stderr");
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_output_success() {
        let ok = ToolOutput {
            status: Some(0),
            ..Default::default()
        };
        let failed = ToolOutput {
            status: Some(1),
            ..Default::default()
        };
        let killed = ToolOutput::default();

        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
    }

    #[test]
    fn test_process_runner_missing_program() {
        let err = ProcessRunner
            .run("mdconv-definitely-not-installed", &[])
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
        assert!(err.to_string().contains("mdconv-definitely-not-installed"));
    }
}
