//! Conversion pipeline.
//!
//! Stages the Markdown input in a fresh directory, runs the primary tool,
//! and rasterizes the PDF intermediate when PNG output is requested.
//!
//! Each conversion gets its own staging directory, so concurrent requests
//! never share input or output paths. The directory lives as long as the
//! returned [`ConvertedDocument`] and is removed when it is dropped. On error
//! it is removed before the error is returned.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::error::{ConvertError, Stage};
use crate::format::{ConversionPlan, OutputFormat};
use crate::tool::{ToolError, ToolRunner};

/// Name of the staged Markdown file inside a staging directory.
const INPUT_FILENAME: &str = "input.md";

/// Prefix for staging directory names.
const STAGING_PREFIX: &str = "mdconv-";

/// One way of invoking the raster tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterCommand {
    /// Executable name.
    pub program: String,
    /// Arguments placed before the rendering options (e.g. `convert` for `magick convert`).
    pub leading_args: Vec<String>,
}

impl RasterCommand {
    /// Build from a `[program, args...]` list. Returns `None` for an empty list.
    #[must_use]
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        let (program, rest) = parts.split_first()?;
        Some(Self {
            program: program.clone(),
            leading_args: rest.to_vec(),
        })
    }
}

impl fmt::Display for RasterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.leading_args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// External tool settings.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Document conversion executable.
    pub pandoc: String,
    /// Raster tool invocations, tried in order while the program is missing.
    pub raster: Vec<RasterCommand>,
    /// Rasterization density in DPI.
    pub density: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            pandoc: "pandoc".to_owned(),
            raster: vec![
                RasterCommand {
                    program: "convert".to_owned(),
                    leading_args: Vec::new(),
                },
                RasterCommand {
                    program: "magick".to_owned(),
                    leading_args: vec!["convert".to_owned()],
                },
            ],
            density: 300,
        }
    }
}

/// Finished conversion.
///
/// Owns the staging directory; dropping this removes every staged file.
#[derive(Debug)]
pub struct ConvertedDocument {
    staging: TempDir,
    path: PathBuf,
    filename: String,
    format: OutputFormat,
}

impl ConvertedDocument {
    /// Path of the final file inside the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Download filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Effective output format.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Staging directory holding this conversion's files.
    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// Read the final file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    /// Copy the final file into `dir` under its download filename.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the copy fails.
    pub fn persist_into(&self, dir: &Path) -> io::Result<PathBuf> {
        let target = dir.join(&self.filename);
        std::fs::copy(&self.path, &target)?;
        Ok(target)
    }
}

/// Runs conversions through a [`ToolRunner`].
pub struct Converter {
    runner: Arc<dyn ToolRunner>,
    tools: ToolSettings,
    staging_root: PathBuf,
}

impl Converter {
    /// Create a converter.
    ///
    /// * `runner` - tool invocation capability
    /// * `tools` - tool names and raster options
    /// * `staging_root` - parent directory for per-conversion staging directories
    pub fn new(runner: Arc<dyn ToolRunner>, tools: ToolSettings, staging_root: PathBuf) -> Self {
        Self {
            runner,
            tools,
            staging_root,
        }
    }

    /// Tool runner used for conversions.
    #[must_use]
    pub fn runner(&self) -> &dyn ToolRunner {
        self.runner.as_ref()
    }

    /// Tool settings.
    #[must_use]
    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Convert `markdown` according to `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if staging fails, a tool is missing or exits
    /// non-zero, or an expected output file was not created.
    pub fn convert(
        &self,
        markdown: &[u8],
        plan: &ConversionPlan,
    ) -> Result<ConvertedDocument, ConvertError> {
        std::fs::create_dir_all(&self.staging_root)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.staging_root)?;

        let input = staging.path().join(INPUT_FILENAME);
        std::fs::write(&input, markdown)?;

        let output = staging.path().join(&plan.output_filename);
        tracing::info!(
            format = %plan.format,
            output = %plan.output_filename,
            staging = %staging.path().display(),
            "Converting document"
        );

        self.run_primary(plan, &input, &output)?;

        let path = if plan.format.is_raster() {
            let png = output.with_extension("png");
            self.rasterize(&output, &png)?;
            if !png.exists() {
                tracing::error!(path = %png.display(), "PNG file was not created");
                return Err(ConvertError::OutputMissing {
                    stage: Stage::Raster,
                    path: png,
                });
            }
            png
        } else {
            if !output.exists() {
                tracing::error!(path = %output.display(), "Output file was not created");
                return Err(ConvertError::OutputMissing {
                    stage: Stage::Primary,
                    path: output,
                });
            }
            output
        };

        Ok(ConvertedDocument {
            staging,
            path,
            filename: plan.final_filename(),
            format: plan.format,
        })
    }

    /// Run the document conversion tool.
    fn run_primary(
        &self,
        plan: &ConversionPlan,
        input: &Path,
        output: &Path,
    ) -> Result<(), ConvertError> {
        let program = self.tools.pandoc.as_str();
        let args = plan.primary_args(input, output);

        let result = self.runner.run(program, &args).map_err(|e| match e {
            ToolError::NotFound { program } => ConvertError::ToolMissing {
                stage: Stage::Primary,
                programs: vec![program],
            },
            other => ConvertError::Tool(other),
        })?;

        if !result.success() {
            tracing::warn!(program, status = ?result.status, stderr = %result.stderr, "Conversion tool failed");
            return Err(ConvertError::ToolFailed {
                stage: Stage::Primary,
                program: program.to_owned(),
                status: result.status,
                stderr: result.stderr,
            });
        }

        Ok(())
    }

    /// Rasterize `pdf` into `png`, trying each configured raster command.
    ///
    /// A command whose program is missing falls through to the next one.
    /// Any other outcome ends the search.
    fn rasterize(&self, pdf: &Path, png: &Path) -> Result<(), ConvertError> {
        let options = self.raster_options(pdf, png);
        let mut missing = Vec::new();

        for command in &self.tools.raster {
            let mut args: Vec<OsString> =
                command.leading_args.iter().map(OsString::from).collect();
            args.extend(options.iter().cloned());

            match self.runner.run(&command.program, &args) {
                Ok(result) if result.success() => return Ok(()),
                Ok(result) => {
                    tracing::warn!(command = %command, status = ?result.status, stderr = %result.stderr, "Raster tool failed");
                    return Err(ConvertError::ToolFailed {
                        stage: Stage::Raster,
                        program: command.program.clone(),
                        status: result.status,
                        stderr: result.stderr,
                    });
                }
                Err(ToolError::NotFound { program }) => {
                    tracing::debug!(command = %command, "Raster tool not found, trying next");
                    missing.push(program);
                }
                Err(other) => return Err(ConvertError::Tool(other)),
            }
        }

        Err(ConvertError::ToolMissing {
            stage: Stage::Raster,
            programs: missing,
        })
    }

    /// Rendering options shared by every raster command.
    fn raster_options(&self, pdf: &Path, png: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-density"),
            OsString::from(self.tools.density.to_string()),
            OsString::from("-strip"),
            OsString::from("-colorspace"),
            OsString::from("sRGB"),
            OsString::from("-flatten"),
            pdf.as_os_str().to_owned(),
            png.as_os_str().to_owned(),
        ]
    }
}
