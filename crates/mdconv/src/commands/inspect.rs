//! `mdconv inspect` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdconv_config::Config;
use mdconv_convert::{ProcessRunner, inspect};
use mdconv_server::server_config_from_config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the inspect command.
#[derive(Args)]
pub(crate) struct InspectArgs {
    /// Path to configuration file (default: auto-discover mdconv.toml).
    #[arg(short, long, env = "MDCONV_CONFIG")]
    config: Option<PathBuf>,
}

impl InspectArgs {
    /// Execute the inspect command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails to load.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let server_config = server_config_from_config(&config);
        let report = inspect(&ProcessRunner, &server_config.tools);

        output.info(report.to_string().trim_end());
        if !report.all_found() {
            output.warning("Some tools are unavailable; affected formats will fail");
        }
        Ok(())
    }
}
