//! HTTP server for mdconv.
//!
//! This crate provides the axum server in front of the conversion pipeline:
//! - `GET /` serves the upload form
//! - `POST /convert` converts a multipart upload
//! - `POST /api/convert` converts a JSON body
//! - `GET /debug/inspector` reports which external tools are available
//!
//! # Quick Start
//!
//! ```ignore
//! use mdconv_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         port: 8777,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser / client ──HTTP──► axum server (mdconv-server)
//!                                 │
//!                                 ├─► FormatResolver ──► ConversionPlan
//!                                 │
//!                                 └─► spawn_blocking ──► Converter
//!                                                          │
//!                                                          ├─► pandoc
//!                                                          └─► convert / magick (PNG)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod relay;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use mdconv_convert::{
    Converter, FormatResolver, ProcessRunner, RasterCommand, ToolRunner, ToolSettings,
};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding LaTeX templates.
    pub template_dir: PathBuf,
    /// Parent directory for per-request staging directories.
    pub staging_dir: PathBuf,
    /// LaTeX engine passed to pandoc for PDF and PNG.
    pub pdf_engine: String,
    /// External tool commands.
    pub tools: ToolSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8777,
            template_dir: PathBuf::from("/app/latex_templates"),
            staging_dir: std::env::temp_dir(),
            pdf_engine: "xelatex".to_owned(),
            tools: ToolSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Build the format resolver for this configuration.
    #[must_use]
    pub fn resolver(&self) -> FormatResolver {
        FormatResolver::new(&self.pdf_engine, &self.template_dir)
    }

    /// Build a converter that runs tools through `runner`.
    #[must_use]
    pub fn converter(&self, runner: Arc<dyn ToolRunner>) -> Converter {
        Converter::new(runner, self.tools.clone(), self.staging_dir.clone())
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    run_server_with_runner(config, Arc::new(ProcessRunner)).await
}

/// Run the server with a custom tool runner.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server_with_runner(
    config: ServerConfig,
    runner: Arc<dyn ToolRunner>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        resolver: config.resolver(),
        converter: config.converter(runner),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        template_dir = %config.template_dir.display(),
        staging_dir = %config.staging_dir.display(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from mdconv config.
///
/// Raster entries without a program are skipped; [`mdconv_config::Config::validate`]
/// rejects those before this is reached.
#[must_use]
pub fn server_config_from_config(config: &mdconv_config::Config) -> ServerConfig {
    let raster = config
        .tools
        .raster
        .iter()
        .filter_map(|parts| RasterCommand::from_parts(parts))
        .collect();

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        template_dir: config.paths_resolved.template_dir.clone(),
        staging_dir: config.paths_resolved.staging_root(),
        pdf_engine: config.tools.pdf_engine.clone(),
        tools: ToolSettings {
            pandoc: config.tools.pandoc.clone(),
            raster,
            density: config.tools.density,
        },
    }
}
