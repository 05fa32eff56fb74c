//! Conversion error types.

use std::fmt;
use std::path::PathBuf;

use crate::tool::ToolError;

/// Pipeline step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Markdown to document (pandoc).
    Primary,
    /// PDF to PNG (ImageMagick).
    Raster,
}

impl Stage {
    fn output_missing_message(self) -> &'static str {
        match self {
            Self::Raster => "Error in PNG conversion: output not created",
            Self::Primary => "Error during conversion: output not created",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Raster => "raster",
        })
    }
}

/// Conversion error.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Tool exited non-zero. Carries the tool's raw stderr.
    ///
    /// The message text is what existing clients match on; keep it stable.
    #[error("Error during conversion (CalledProcessError): {stderr}")]
    ToolFailed {
        stage: Stage,
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    /// None of the candidate programs for a stage is installed.
    #[error("{} not found in PATH ({stage} stage)", .programs.join(", "))]
    ToolMissing { stage: Stage, programs: Vec<String> },

    /// Tool reported success but its output file is absent.
    #[error("{}", .stage.output_missing_message())]
    OutputMissing { stage: Stage, path: PathBuf },

    /// Tool could not be started for a reason other than absence.
    #[error("{0}")]
    Tool(#[source] ToolError),

    /// Staging I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Whether the error is a tool failure reported with its own message.
    ///
    /// A missing program is not: it is surfaced like any other unexpected
    /// failure.
    #[must_use]
    pub fn is_tool_error(&self) -> bool {
        matches!(self, Self::ToolFailed { .. } | Self::OutputMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failed_embeds_stderr() {
        let err = ConvertError::ToolFailed {
            stage: Stage::Primary,
            program: "pandoc".to_owned(),
            status: Some(43),
            stderr: "! LaTeX Error: File `foo.sty' not found.".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Error during conversion (CalledProcessError): ! LaTeX Error: File `foo.sty' not found."
        );
        assert!(err.is_tool_error());
    }

    #[test]
    fn test_tool_missing_lists_programs() {
        let err = ConvertError::ToolMissing {
            stage: Stage::Raster,
            programs: vec!["convert".to_owned(), "magick".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "convert, magick not found in PATH (raster stage)"
        );
        assert!(!err.is_tool_error());
    }

    #[test]
    fn test_output_missing_message() {
        let err = ConvertError::OutputMissing {
            stage: Stage::Raster,
            path: PathBuf::from("/tmp/x.png"),
        };
        assert_eq!(err.to_string(), "Error in PNG conversion: output not created");
        assert!(err.is_tool_error());
    }

    #[test]
    fn test_io_is_not_tool_error() {
        let err = ConvertError::Io(std::io::Error::other("disk full"));
        assert!(!err.is_tool_error());
        assert_eq!(err.to_string(), "I/O error: disk full");
    }
}
