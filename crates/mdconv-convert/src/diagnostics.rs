//! Tool availability report.
//!
//! Probes the configured conversion and raster tools: where they live on
//! `PATH` and what `--version` prints.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::pipeline::ToolSettings;
use crate::tool::{ToolError, ToolRunner};

/// Result of running `<tool> --version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Tool ran; carries its stdout.
    Version(String),
    /// Tool ran but failed; carries stderr or the spawn error.
    Failed(String),
    /// Tool is not installed.
    NotFound,
}

/// Status of one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Program name as configured.
    pub program: String,
    /// Resolved executable path, if on `PATH`.
    pub location: Option<PathBuf>,
    /// Version probe result.
    pub outcome: ProbeOutcome,
}

/// Status of every configured tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsReport {
    pub tools: Vec<ToolStatus>,
}

impl DiagnosticsReport {
    /// Whether every probed tool answered `--version`.
    #[must_use]
    pub fn all_found(&self) -> bool {
        self.tools
            .iter()
            .all(|t| matches!(t.outcome, ProbeOutcome::Version(_)))
    }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tool) in self.tools.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match &tool.location {
                Some(path) => writeln!(f, "{}: {}", tool.program, path.display())?,
                None => writeln!(f, "{}: not in PATH", tool.program)?,
            }
            match &tool.outcome {
                ProbeOutcome::Version(stdout) => writeln!(f, "{}", stdout.trim_end())?,
                ProbeOutcome::Failed(stderr) => {
                    writeln!(f, "Error calling '{} --version':", tool.program)?;
                    writeln!(f, "{}", stderr.trim_end())?;
                }
                ProbeOutcome::NotFound => writeln!(f, "{} was NOT found.", tool.program)?,
            }
        }
        Ok(())
    }
}

/// Probe the primary tool and each distinct raster program.
pub fn inspect(runner: &dyn ToolRunner, tools: &ToolSettings) -> DiagnosticsReport {
    let mut programs = vec![tools.pandoc.clone()];
    for command in &tools.raster {
        if !programs.contains(&command.program) {
            programs.push(command.program.clone());
        }
    }

    let tools = programs
        .into_iter()
        .map(|program| probe(runner, program))
        .collect();
    DiagnosticsReport { tools }
}

fn probe(runner: &dyn ToolRunner, program: String) -> ToolStatus {
    let location = which::which(&program).ok();
    let outcome = match runner.run(&program, &[OsString::from("--version")]) {
        Ok(result) if result.success() => ProbeOutcome::Version(result.stdout),
        Ok(result) => ProbeOutcome::Failed(result.stderr),
        Err(ToolError::NotFound { .. }) => ProbeOutcome::NotFound,
        Err(e @ ToolError::Io { .. }) => ProbeOutcome::Failed(e.to_string()),
    };
    tracing::debug!(program = %program, ?location, ?outcome, "Probed tool");

    ToolStatus {
        program,
        location,
        outcome,
    }
}
