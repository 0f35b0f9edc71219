//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable holding the Zephyr Scale / Jira base URL.
pub const ENV_BASE_URL: &str = "ZEPHYR_BASE_URL";

/// Environment variable holding the bearer API token.
pub const ENV_API_KEY: &str = "ZEPHYR_API_KEY";

/// Environment variable forcing the deployment kind (`cloud` or `datacenter`).
pub const ENV_DEPLOYMENT: &str = "JIRA_TYPE";

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Zephyr Scale connection settings.
    #[serde(default)]
    pub zephyr: ZephyrConfig,

    /// Directories that `file://` resources may be read from.
    #[serde(default)]
    pub allowed_paths: Vec<PathBuf>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Overlays environment variables on top of the file settings.
    ///
    /// `lookup` returns the value of a variable; empty values are treated
    /// as unset so an exported-but-blank variable never masks the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = non_empty(ENV_BASE_URL) {
            self.zephyr.base_url = Some(base_url);
        }
        if let Some(api_key) = non_empty(ENV_API_KEY) {
            self.zephyr.api_key = Some(api_key);
        }
        if let Some(deployment) = non_empty(ENV_DEPLOYMENT) {
            self.zephyr.deployment = Some(deployment);
        }
    }

    /// Validates the configuration.
    ///
    /// Presence of the base URL and credential is checked later, when the
    /// backend profile is built.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zephyr.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "zephyr.timeout_secs must be greater than zero".to_string(),
            });
        }

        if let Some(ref base_url) = self.zephyr.base_url {
            let trimmed = base_url.trim();
            if !trimmed.is_empty()
                && !trimmed.starts_with("http://")
                && !trimmed.starts_with("https://")
            {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "Invalid base URL '{trimmed}'. Must start with http:// or https://"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Zephyr Scale connection settings.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZephyrConfig {
    /// Jira / Zephyr Scale base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer API token.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Explicit deployment kind: "cloud" or "datacenter".
    #[serde(default)]
    pub deployment: Option<String>,

    /// Per-request timeout in seconds.
    /// Default: 30
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ZephyrConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            deployment: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ZephyrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZephyrConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("deployment", &self.deployment)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.zephyr.base_url.is_none());
        assert_eq!(config.zephyr.timeout_secs, 30);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "zephyr": {
                "base_url": "https://jira.internal.acme.com",
                "api_key": "secret-token",
                "deployment": "datacenter",
                "timeout_secs": 10
            },
            "allowed_paths": ["/tmp/payloads"],
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.zephyr.base_url.as_deref(),
            Some("https://jira.internal.acme.com")
        );
        assert_eq!(config.zephyr.api_key.as_deref(), Some("secret-token"));
        assert_eq!(config.zephyr.deployment.as_deref(), Some("datacenter"));
        assert_eq!(config.zephyr.timeout_secs, 10);
        assert_eq!(config.allowed_paths, vec![PathBuf::from("/tmp/payloads")]);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn reject_zero_timeout() {
        let json = r#"{ "zephyr": { "timeout_secs": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_non_http_base_url() {
        let json = r#"{ "zephyr": { "base_url": "jira.internal.acme.com" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let json = r#"{ "zephyr": { "base_url": "https://old.example.com", "api_key": "old" } }"#;
        let mut config: Config = serde_json::from_str(json).unwrap();

        config.apply_env(env(&[
            (ENV_BASE_URL, "https://acme.atlassian.net"),
            (ENV_API_KEY, "new-token"),
            (ENV_DEPLOYMENT, "cloud"),
        ]));

        assert_eq!(
            config.zephyr.base_url.as_deref(),
            Some("https://acme.atlassian.net")
        );
        assert_eq!(config.zephyr.api_key.as_deref(), Some("new-token"));
        assert_eq!(config.zephyr.deployment.as_deref(), Some("cloud"));
    }

    #[test]
    fn blank_env_values_do_not_mask_file() {
        let json = r#"{ "zephyr": { "api_key": "from-file" } }"#;
        let mut config: Config = serde_json::from_str(json).unwrap();

        config.apply_env(env(&[(ENV_API_KEY, "   ")]));

        assert_eq!(config.zephyr.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ZephyrConfig {
            api_key: Some("super-secret".to_string()),
            ..ZephyrConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
