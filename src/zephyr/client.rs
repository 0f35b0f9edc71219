//! HTTP dispatch to the Zephyr Scale REST API.
//!
//! The tools talk to the backend through the [`ZephyrApi`] trait so they
//! can be exercised against a mock. [`HttpZephyrClient`] is the real
//! implementation, built once from the [`BackendProfile`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::backend::BackendProfile;
use crate::error::ZephyrError;

#[cfg(test)]
use mockall::automock;

/// HTTP verbs used by the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Returns the verb as an uppercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A request against the backend, relative to the profile's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: Method,
    /// Path starting with `/`.
    pub path: String,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    /// Creates a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    /// Creates a PUT request with a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path, Some(body))
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, None)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// A successful backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Parsed JSON body; `Null` when empty, a JSON string when not JSON.
    pub body: Value,
}

impl ApiResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Sends requests to the Zephyr Scale backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ZephyrApi: Send + Sync {
    /// Sends a request.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::Status`] for non-2xx responses and
    /// [`ZephyrError::Transport`] if no response was received.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ZephyrError>;
}

/// `reqwest`-backed implementation of [`ZephyrApi`].
#[derive(Debug, Clone)]
pub struct HttpZephyrClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpZephyrClient {
    /// Builds a client carrying the profile's headers on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if a header is not a valid HTTP header or the
    /// underlying client cannot be built.
    pub fn new(profile: &BackendProfile, timeout: Duration) -> Result<Self, ZephyrError> {
        let mut headers = HeaderMap::new();
        for (name, value) in profile.auth_headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ZephyrError::InvalidHeader {
                    name: name.clone(),
                }
            })?;
            let mut value = HeaderValue::from_str(value).map_err(|_| {
                ZephyrError::InvalidHeader {
                    name: name.as_str().to_string(),
                }
            })?;
            if name == reqwest::header::AUTHORIZATION {
                value.set_sensitive(true);
            }
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ZephyrError::ClientBuild)?;

        Ok(Self {
            base_url: profile.base_url().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Returns the absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Parses a response body: JSON if possible, else a JSON string, `Null` if empty.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait]
impl ZephyrApi for HttpZephyrClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ZephyrError> {
        let url = self.url(&request.path);
        let mut builder = self.http.request(request.method.into(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(
                method = request.method.as_str(),
                path = %request.path,
                error = %e,
                "Zephyr Scale request failed"
            );
            ZephyrError::Transport(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = parse_body(&bytes);

        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            status = status.as_u16(),
            "Zephyr Scale request completed"
        );

        if status.is_success() {
            Ok(ApiResponse::new(status.as_u16(), body))
        } else {
            Err(ZephyrError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
