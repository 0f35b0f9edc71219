//! Configuration file loading and environment overlay.
//!
//! Settings come from two layers, later layers winning:
//!
//! 1. An optional JSON configuration file
//! 2. Environment variables (`ZEPHYR_BASE_URL`, `ZEPHYR_API_KEY`, `JIRA_TYPE`)
//!
//! # Configuration File Locations
//!
//! 1. Path given on the command line (must exist)
//! 2. Default location (skipped silently if absent):
//!    - **Linux/macOS:** `~/.zephyr-scale-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.zephyr-scale-mcp\config.json`

mod settings;

pub use settings::{
    Config, LoggingConfig, ZephyrConfig, ENV_API_KEY, ENV_BASE_URL, ENV_DEPLOYMENT,
};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.zephyr-scale-mcp/`
/// - **Windows:** `%USERPROFILE%\.zephyr-scale-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".zephyr-scale-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads the configuration file and overlays the process environment.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - A setting is invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

/// Like [`load_config`], with an injectable environment lookup.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => read_config_file(p)?,
        None => match default_config_path() {
            Some(default_path) if default_path.exists() => read_config_file(&default_path)?,
            _ => Config::default(),
        },
    };

    config.apply_env(lookup);

    // Validate the merged configuration
    config.validate()?;

    Ok(config)
}

fn read_config_file(config_path: &Path) -> Result<Config, ConfigError> {
    if !config_path.exists() {
        return Err(ConfigError::NotFound {
            path: config_path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.to_path_buf(),
        source: e,
    })
}
