//! Bootstrap configuration loading and config file resolution
//!
//! Flora services read a small TOML file at startup (listen address, artifact
//! paths, logging). Everything in it is static: a change requires a restart.
//!
//! # Config File Resolution
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/flora/<module>.toml`)
//! 4. Built-in defaults (no file)
//!
//! A missing file is not an error: the service logs a warning and starts with
//! defaults. A file that exists but cannot be parsed is fatal.
//!
//! Config is read before the tracing subscriber exists (the log settings live
//! in the file), so [`TomlConfig::resolve_and_load`] returns a [`ConfigSource`]
//! for the caller to log once tracing is up.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FLORA_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface to bind the HTTP server to
    pub host: String,

    /// HTTP server port
    ///
    /// Default: 5730
    pub port: u16,

    /// Path to the ONNX classifier artifact
    pub model_path: PathBuf,

    /// Path to the JSON botanical knowledge base
    pub knowledge_path: PathBuf,

    /// Maximum accepted request body size for uploads
    pub max_upload_bytes: usize,

    /// Intra-op threads used by the inference session
    pub intra_threads: usize,

    /// Logging configuration (optional)
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: default_port(),
            model_path: PathBuf::from("best_mobilenet_v2.onnx"),
            knowledge_path: PathBuf::from("botanical_knowledge.json"),
            max_upload_bytes: 16 * 1024 * 1024,
            intra_threads: 1,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_port() -> u16 {
    5730
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from an existing file
    File(PathBuf),
    /// A file was named but does not exist; defaults were used
    MissingFile(PathBuf),
    /// No candidate file at all; defaults were used
    Defaults,
}

impl ConfigSource {
    /// Report the source through `tracing`
    ///
    /// Missing files are warnings.
    pub fn log(&self, module_name: &str) {
        match self {
            ConfigSource::File(path) => {
                info!("Loaded configuration from {}", path.display())
            }
            ConfigSource::MissingFile(path) => warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            ),
            ConfigSource::Defaults => {
                warn!("No config file for {}, using built-in defaults", module_name)
            }
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    ///
    /// Keys absent from the text keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file
    ///
    /// Missing file → warning + defaults. Unreadable or malformed file → error.
    pub fn load(path: &Path) -> Result<Self> {
        let (config, source) = Self::read_file(path)?;
        source.log("config");
        Ok(config)
    }

    /// Resolve and load the configuration for a module
    ///
    /// Nothing is logged here; the returned [`ConfigSource`] says which file
    /// (if any) was used.
    pub fn resolve_and_load(
        cli_arg: Option<&Path>,
        module_name: &str,
    ) -> Result<(Self, ConfigSource)> {
        match resolve_config_path(cli_arg, module_name) {
            Some(path) => Self::read_file(&path),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    fn read_file(path: &Path) -> Result<(Self, ConfigSource)> {
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::MissingFile(path.to_path_buf())));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }
}

/// Resolve which config file to read
///
/// Returns `None` when no candidate exists at all. An explicit CLI or
/// environment path is returned even if it does not exist, so that the
/// loader can report it.
pub fn resolve_config_path(cli_arg: Option<&Path>, module_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path(module_name).filter(|p| p.exists())
}

/// Platform config file location for a module (may not exist)
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flora").join(format!("{}.toml", module_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        assert_eq!(default_port(), 5730);
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn test_default_config_path_is_module_scoped() {
        if let Some(path) = default_config_path("flora-id") {
            assert!(path.ends_with("flora/flora-id.toml"));
        }
    }
}
