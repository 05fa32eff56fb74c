//! Configuration management for mdconv.
//!
//! Parses `mdconv.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `paths.template_dir`
//! - `paths.staging_dir`
//! - `tools.pandoc`
//! - `tools.pdf_engine`
//! - every element of `tools.raster`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override LaTeX template directory.
    pub template_dir: Option<PathBuf>,
    /// Override staging root for per-request working directories.
    pub staging_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdconv.toml";

/// Template directory used by the container deployment.
const DEFAULT_TEMPLATE_DIR: &str = "/app/latex_templates";

/// Upper bound for raster density.
const MAX_DENSITY: u32 = 1200;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Filesystem locations (paths are relative strings from TOML).
    paths: PathsConfigRaw,
    /// External tool configuration.
    pub tools: ToolsConfig,

    /// Resolved filesystem locations (set after loading).
    #[serde(skip)]
    pub paths_resolved: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8777,
        }
    }
}

/// Raw path configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PathsConfigRaw {
    template_dir: Option<String>,
    staging_dir: Option<String>,
}

/// Resolved filesystem locations.
#[derive(Debug)]
pub struct PathsConfig {
    /// Directory holding LaTeX templates offered to clients.
    pub template_dir: PathBuf,
    /// Root for per-request staging directories (`None` uses the OS temp dir).
    pub staging_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            staging_dir: None,
        }
    }
}

impl PathsConfig {
    /// Staging root, falling back to the OS temp dir.
    #[must_use]
    pub fn staging_root(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// External tool configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Document conversion executable.
    pub pandoc: String,
    /// PDF engine passed as `--pdf-engine`.
    pub pdf_engine: String,
    /// Raster tool invocations, tried in order. Each entry is a program
    /// followed by its leading arguments (e.g. `["magick", "convert"]`).
    pub raster: Vec<Vec<String>>,
    /// Rasterization density in DPI.
    pub density: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pandoc: "pandoc".to_owned(),
            pdf_engine: "xelatex".to_owned(),
            raster: vec![
                vec!["convert".to_owned()],
                vec!["magick".to_owned(), "convert".to_owned()],
            ],
            density: 300,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`tools.pandoc`").
        field: String,
        /// Error message (e.g., "${`PANDOC_BIN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdconv.toml` in current directory and parents,
    /// and falls back to built-in defaults when none is found.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(template_dir) = &settings.template_dir {
            self.paths_resolved.template_dir.clone_from(template_dir);
        }
        if let Some(staging_dir) = &settings.staging_dir {
            self.paths_resolved.staging_dir = Some(staging_dir.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_tools()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate tool configuration.
    fn validate_tools(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.tools.pandoc, "tools.pandoc")?;
        require_non_empty(&self.tools.pdf_engine, "tools.pdf_engine")?;

        if self.tools.raster.is_empty() {
            return Err(ConfigError::Validation(
                "tools.raster needs at least one command".to_owned(),
            ));
        }
        for (i, command) in self.tools.raster.iter().enumerate() {
            let program = command.first().map_or("", String::as_str);
            require_non_empty(program, &format!("tools.raster[{i}]"))?;
        }

        let density = self.tools.density;
        if density == 0 {
            return Err(ConfigError::Validation(
                "tools.density must be greater than 0".to_owned(),
            ));
        }
        if density > MAX_DENSITY {
            return Err(ConfigError::Validation(format!(
                "tools.density cannot exceed {MAX_DENSITY}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.tools.pandoc = expand::expand_env(&self.tools.pandoc, "tools.pandoc")?;
        self.tools.pdf_engine = expand::expand_env(&self.tools.pdf_engine, "tools.pdf_engine")?;
        expand::expand_opt(&mut self.paths.template_dir, "paths.template_dir")?;
        expand::expand_opt(&mut self.paths.staging_dir, "paths.staging_dir")?;
        expand::expand_commands(&mut self.tools.raster, "tools.raster")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.paths_resolved = PathsConfig {
            template_dir: config_dir.join(
                self.paths
                    .template_dir
                    .as_deref()
                    .unwrap_or(DEFAULT_TEMPLATE_DIR),
            ),
            staging_dir: self.paths.staging_dir.as_deref().map(|d| config_dir.join(d)),
        };
    }
}
