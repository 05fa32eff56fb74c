//! `mdconv convert` command implementation.
//!
//! Runs one conversion through the same pipeline the server uses and copies
//! the result into the output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use mdconv_config::Config;
use mdconv_convert::ProcessRunner;
use mdconv_server::server_config_from_config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert.
    input: PathBuf,

    /// Output format: pdf, png, docx, epub, html, odt, latex or rst.
    #[arg(short, long, default_value = "pdf")]
    format: String,

    /// LaTeX template name from the template directory (pdf and latex only).
    #[arg(short, long)]
    template: Option<String>,

    /// Directory to write the result into.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Path to configuration file (default: auto-discover mdconv.toml).
    #[arg(short, long, env = "MDCONV_CONFIG")]
    config: Option<PathBuf>,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input can't be read, the conversion fails, or
    /// the result can't be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if !self.output_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Output directory does not exist: {}",
                self.output_dir.display()
            )));
        }

        let config = Config::load(self.config.as_deref(), None)?;
        let server_config = server_config_from_config(&config);
        let resolver = server_config.resolver();
        let converter = server_config.converter(Arc::new(ProcessRunner));

        let markdown = std::fs::read(&self.input)?;
        let plan = resolver.resolve(
            &self.format,
            &input_filename(&self.input),
            self.template.as_deref(),
        );
        output.info(&format!(
            "Converting {} to {}...",
            self.input.display(),
            plan.format
        ));

        let document = converter.convert(&markdown, &plan)?;
        let written = document.persist_into(&self.output_dir)?;

        output.success(&format!("Wrote {}", written.display()));
        Ok(())
    }
}

/// File name component of the input path, as sent by a browser upload.
fn input_filename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
