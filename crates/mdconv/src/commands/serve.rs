//! `mdconv serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdconv_config::{CliSettings, Config};
use mdconv_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover mdconv.toml).
    #[arg(short, long, env = "MDCONV_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "MDCONV_PORT")]
    port: Option<u16>,

    /// LaTeX template directory (overrides config).
    #[arg(short, long)]
    template_dir: Option<PathBuf>,

    /// Parent directory for per-request staging (overrides config).
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Enable verbose output (log every request and tool call).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            template_dir: self.template_dir,
            staging_dir: self.staging_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Template directory: {}",
            config.paths_resolved.template_dir.display()
        ));
        output.info(&format!(
            "Staging directory: {}",
            config.paths_resolved.staging_root().display()
        ));
        if !config.paths_resolved.template_dir.is_dir() {
            output.warning("Template directory does not exist, no templates will be offered");
        }

        let server_config = server_config_from_config(&config);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
