//! Mock tool runner for testing.
//!
//! Provides [`MockToolRunner`] for unit testing without pandoc or
//! ImageMagick installed.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::tool::{ToolError, ToolOutput, ToolRunner};

/// Scripted outcome for one program.
#[derive(Debug, Clone)]
enum Behavior {
    Missing,
    Fail { status: i32, stderr: String },
    Succeed { stdout: String, output: Option<Vec<u8>> },
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<OsString>,
}

/// Mock runner with per-program scripted behavior.
///
/// Programs without a configured behavior are reported as not found.
/// Successful runs can write bytes to the invocation's output file: the
/// argument after `-o` if present, otherwise the last argument.
///
/// # Example
///
/// ```ignore
/// use mdconv_convert::MockToolRunner;
///
/// let runner = MockToolRunner::new()
///     .with_success("pandoc", b"%PDF-1.7")
///     .with_missing("convert")
///     .with_success("magick", b"\x89PNG");
/// ```
#[derive(Debug, Default)]
pub struct MockToolRunner {
    behaviors: RwLock<HashMap<String, Behavior>>,
    calls: RwLock<Vec<Invocation>>,
}

impl MockToolRunner {
    /// Create a runner where every program is missing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_behavior(self, program: &str, behavior: Behavior) -> Self {
        self.behaviors
            .write()
            .unwrap()
            .insert(program.to_owned(), behavior);
        self
    }

    /// Program exits 0 and writes `output` to its output file.
    #[must_use]
    pub fn with_success(self, program: &str, output: &[u8]) -> Self {
        self.with_behavior(
            program,
            Behavior::Succeed {
                stdout: String::new(),
                output: Some(output.to_vec()),
            },
        )
    }

    /// Program exits 0, prints `stdout`, and writes nothing.
    #[must_use]
    pub fn with_stdout(self, program: &str, stdout: &str) -> Self {
        self.with_behavior(
            program,
            Behavior::Succeed {
                stdout: stdout.to_owned(),
                output: None,
            },
        )
    }

    /// Program exits 0 without writing any output file.
    #[must_use]
    pub fn with_silent_success(self, program: &str) -> Self {
        self.with_behavior(
            program,
            Behavior::Succeed {
                stdout: String::new(),
                output: None,
            },
        )
    }

    /// Program exits with `status` and prints `stderr`.
    #[must_use]
    pub fn with_failure(self, program: &str, status: i32, stderr: &str) -> Self {
        self.with_behavior(
            program,
            Behavior::Fail {
                status,
                stderr: stderr.to_owned(),
            },
        )
    }

    /// Program is not installed.
    #[must_use]
    pub fn with_missing(self, program: &str) -> Self {
        self.with_behavior(program, Behavior::Missing)
    }

    /// All recorded invocations, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.read().unwrap().clone()
    }

    /// Programs invoked, in call order.
    #[must_use]
    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }
}

/// Output file of an invocation: the argument after `-o`, else the last one.
fn output_target(args: &[OsString]) -> Option<PathBuf> {
    if let Some(pos) = args.iter().position(|a| a == "-o") {
        return args.get(pos + 1).map(PathBuf::from);
    }
    if args.len() < 2 {
        return None;
    }
    args.last().map(PathBuf::from)
}

impl ToolRunner for MockToolRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        self.calls.write().unwrap().push(Invocation {
            program: program.to_owned(),
            args: args.to_vec(),
        });

        let behavior = self
            .behaviors
            .read()
            .unwrap()
            .get(program)
            .cloned()
            .unwrap_or(Behavior::Missing);

        match behavior {
            Behavior::Missing => Err(ToolError::NotFound {
                program: program.to_owned(),
            }),
            Behavior::Fail { status, stderr } => Ok(ToolOutput {
                status: Some(status),
                stdout: String::new(),
                stderr,
            }),
            Behavior::Succeed { stdout, output } => {
                if let (Some(bytes), Some(target)) = (output, output_target(args)) {
                    std::fs::write(&target, bytes).map_err(|source| ToolError::Io {
                        program: program.to_owned(),
                        source,
                    })?;
                }
                Ok(ToolOutput {
                    status: Some(0),
                    stdout,
                    stderr: String::new(),
                })
            }
        }
    }
}
