//! Error types for zephyr-scale-mcp.
//!
//! # Security Note
//!
//! Error messages are carefully crafted to NEVER include credentials.
//! Variants that relate to the API key only name the setting, never its
//! value, and backend errors carry the response body but not the request
//! headers.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during configuration operations.
///
/// All variants are permanent: the operator has to fix the configuration
/// and restart the server.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },

    /// No Zephyr Scale base URL was configured.
    #[error("base URL required: set ZEPHYR_BASE_URL or zephyr.base_url")]
    MissingBaseUrl,

    /// No API credential was configured.
    #[error("credential required: set ZEPHYR_API_KEY or zephyr.api_key")]
    MissingCredential,
}

/// Errors returned by the Zephyr Scale REST dispatcher.
#[derive(Error, Debug)]
pub enum ZephyrError {
    /// A profile header could not be encoded. The value is never echoed.
    #[error("invalid value for HTTP header '{name}'")]
    InvalidHeader {
        /// Header name.
        name: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Status: {status}, Data: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, parsed as JSON when possible.
        body: Value,
    },
}

impl ZephyrError {
    /// Returns the HTTP status code if the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::InvalidHeader { .. } | Self::ClientBuild(_) | Self::Transport(_) => None,
        }
    }

    /// Returns `true` if the backend answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

/// Reasons a test case or test run key cannot name a single resource.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Blank after trimming.
    #[error("must not be empty")]
    Empty,

    /// Contains URL syntax that would leave the resource's path segment.
    #[error("must not contain '{0}'")]
    ForbiddenChar(char),

    /// Is `.` or `..`.
    #[error("must not be a relative path segment")]
    DotSegment,
}

/// Errors returned by tool handlers.
///
/// Mapped onto JSON-RPC error objects by the server: invalid arguments
/// become `-32602`, backend failures `-32603`, unknown tools `-32601`.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments were missing or malformed.
    #[error("{0}")]
    InvalidParams(String),

    /// The backend call failed.
    #[error("Failed to {action}: {message}")]
    Failed {
        /// What the tool was doing, e.g. `get test case`.
        action: &'static str,
        /// Backend or lookup detail.
        message: String,
    },

    /// No tool with this name exists.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Wraps a backend error for `action`.
    #[must_use]
    pub fn backend(action: &'static str, error: &ZephyrError) -> Self {
        Self::Failed {
            action,
            message: error.to_string(),
        }
    }
}

/// Errors returned when reading an MCP resource.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The URI is unknown, incomplete or not permitted.
    #[error("{0}")]
    InvalidRequest(String),

    /// The resource exists but could not be produced.
    #[error("Failed to {action}: {message}")]
    Failed {
        /// What was being read, e.g. `read file`.
        action: &'static str,
        /// Underlying detail.
        message: String,
    },
}
