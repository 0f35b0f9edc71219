//! Backend resolution: Cloud vs Data Center.
//!
//! Zephyr Scale ships in two flavours with different REST conventions:
//!
//! | | Data Center | Cloud |
//! |---|---|---|
//! | Host | the Jira base URL | `api.zephyrscale.smartbear.com/v2` |
//! | Paths | `/rest/atm/1.0/testcase`, ... | `/testcases`, ... |
//!
//! Both use bearer-token authentication. [`build_profile`] is called once
//! at startup and the resulting [`BackendProfile`] is shared read-only for
//! the lifetime of the process.

mod endpoints;

pub use endpoints::{check_key, EndpointTable, Resource, DATA_CENTER_NAMESPACE};

use std::collections::BTreeMap;
use std::fmt;

use crate::config::ZephyrConfig;
use crate::error::ConfigError;

/// Fixed API host for Zephyr Scale Cloud.
pub const CLOUD_API_BASE_URL: &str = "https://api.zephyrscale.smartbear.com/v2";

/// Host suffix identifying an Atlassian Cloud site.
const CLOUD_HOST_MARKER: &str = ".atlassian.net";

/// Which REST dialect the backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentKind {
    /// Zephyr Scale Cloud (Atlassian Cloud sites).
    Cloud,
    /// Zephyr Scale Data Center / Server plugin.
    DataCenter,
}

impl DeploymentKind {
    /// Parses an explicit override, case-insensitively.
    ///
    /// Returns `None` for anything other than `cloud` or `datacenter`.
    #[must_use]
    pub fn from_override(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cloud" => Some(Self::Cloud),
            "datacenter" => Some(Self::DataCenter),
            _ => None,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::DataCenter => "datacenter",
        }
    }
}

impl fmt::Display for DeploymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guesses the deployment kind from the base URL and an optional override.
///
/// An Atlassian Cloud host always wins; otherwise a valid override is
/// honoured; otherwise Data Center is assumed.
#[must_use]
pub fn detect_kind(base_url: &str, explicit_override: Option<&str>) -> DeploymentKind {
    if base_url.contains(CLOUD_HOST_MARKER) {
        return DeploymentKind::Cloud;
    }

    explicit_override
        .and_then(DeploymentKind::from_override)
        .unwrap_or(DeploymentKind::DataCenter)
}

/// Resolved connection settings for the Zephyr Scale backend.
///
/// Immutable once built. The `Debug` implementation redacts the
/// authorization header.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendProfile {
    kind: DeploymentKind,
    base_url: String,
    auth_headers: BTreeMap<String, String>,
    endpoints: EndpointTable,
}

impl BackendProfile {
    /// Deployment kind.
    #[must_use]
    pub const fn kind(&self) -> DeploymentKind {
        self.kind
    }

    /// Effective API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request.
    #[must_use]
    pub const fn auth_headers(&self) -> &BTreeMap<String, String> {
        &self.auth_headers
    }

    /// REST path templates.
    #[must_use]
    pub const fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }
}

impl fmt::Debug for BackendProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .auth_headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("BackendProfile")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("auth_headers", &headers)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Builds the backend profile from configuration.
///
/// # Errors
///
/// Returns [`ConfigError::MissingBaseUrl`] or
/// [`ConfigError::MissingCredential`] if either setting is absent or blank.
pub fn build_profile(config: &ZephyrConfig) -> Result<BackendProfile, ConfigError> {
    let base_url = non_blank(config.base_url.as_ref()).ok_or(ConfigError::MissingBaseUrl)?;
    let api_key = non_blank(config.api_key.as_ref()).ok_or(ConfigError::MissingCredential)?;

    let deployment = non_blank(config.deployment.as_ref());
    if let Some(value) = deployment {
        if DeploymentKind::from_override(value).is_none() {
            tracing::warn!(
                deployment = value,
                "Ignoring unrecognised deployment override (expected 'cloud' or 'datacenter')"
            );
        }
    }

    let kind = detect_kind(base_url, deployment);

    let effective_base_url = match kind {
        DeploymentKind::Cloud => CLOUD_API_BASE_URL.to_string(),
        DeploymentKind::DataCenter => base_url.to_string(),
    };

    let auth_headers = BTreeMap::from([
        ("Authorization".to_string(), format!("Bearer {api_key}")),
        ("Accept".to_string(), "application/json".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ]);

    tracing::debug!(
        kind = %kind,
        base_url = %effective_base_url,
        "Resolved Zephyr Scale backend"
    );

    Ok(BackendProfile {
        kind,
        base_url: effective_base_url,
        auth_headers,
        endpoints: EndpointTable::for_kind(kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zephyr_config(base_url: Option<&str>, api_key: Option<&str>) -> ZephyrConfig {
        ZephyrConfig {
            base_url: base_url.map(str::to_string),
            api_key: api_key.map(str::to_string),
            ..ZephyrConfig::default()
        }
    }

    #[test]
    fn atlassian_host_is_cloud_regardless_of_override() {
        let url = "https://acme.atlassian.net";
        assert_eq!(detect_kind(url, None), DeploymentKind::Cloud);
        assert_eq!(detect_kind(url, Some("datacenter")), DeploymentKind::Cloud);
        assert_eq!(detect_kind(url, Some("bogus")), DeploymentKind::Cloud);
    }

    #[test]
    fn override_applies_to_other_hosts() {
        let url = "https://jira.internal.acme.com";
        assert_eq!(detect_kind(url, Some("cloud")), DeploymentKind::Cloud);
        assert_eq!(detect_kind(url, Some("CLOUD")), DeploymentKind::Cloud);
        assert_eq!(detect_kind(url, Some("DataCenter")), DeploymentKind::DataCenter);
        assert_eq!(detect_kind(url, None), DeploymentKind::DataCenter);
    }

    #[test]
    fn unknown_override_defaults_to_data_center() {
        let url = "https://jira.internal.acme.com";
        assert_eq!(detect_kind(url, Some("server")), DeploymentKind::DataCenter);
        assert_eq!(detect_kind(url, Some("")), DeploymentKind::DataCenter);
    }

    #[test]
    fn missing_base_url_is_fatal() {
        let err = build_profile(&zephyr_config(None, Some("token"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));

        let err = build_profile(&zephyr_config(Some("  "), Some("token"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));
    }

    #[test]
    fn missing_credential_is_fatal() {
        let err =
            build_profile(&zephyr_config(Some("https://jira.internal.acme.com"), None)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential));

        let err = build_profile(&zephyr_config(Some("https://jira.internal.acme.com"), Some("")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential));
    }

    #[test]
    fn cloud_profile_uses_fixed_api_host() {
        let profile =
            build_profile(&zephyr_config(Some("https://acme.atlassian.net"), Some("token")))
                .unwrap();
        assert_eq!(profile.kind(), DeploymentKind::Cloud);
        assert_eq!(profile.base_url(), CLOUD_API_BASE_URL);
        assert_eq!(profile.endpoints().path(Resource::TestCases), "/testcases");
    }

    #[test]
    fn data_center_profile_keeps_base_url_verbatim() {
        let profile = build_profile(&zephyr_config(
            Some("https://jira.internal.acme.com/jira/"),
            Some("token"),
        ))
        .unwrap();
        assert_eq!(profile.kind(), DeploymentKind::DataCenter);
        assert_eq!(profile.base_url(), "https://jira.internal.acme.com/jira/");
        assert_eq!(
            profile.endpoints().path(Resource::TestCases),
            "/rest/atm/1.0/testcase"
        );
    }

    #[test]
    fn override_selects_cloud_for_custom_domain() {
        let config = ZephyrConfig {
            deployment: Some("cloud".to_string()),
            ..zephyr_config(Some("https://jira.acme.com"), Some("token"))
        };
        let profile = build_profile(&config).unwrap();
        assert_eq!(profile.kind(), DeploymentKind::Cloud);
        assert_eq!(profile.base_url(), CLOUD_API_BASE_URL);
    }

    #[test]
    fn auth_headers_are_bearer_json_triple() {
        let profile = build_profile(&zephyr_config(
            Some("https://jira.internal.acme.com"),
            Some("abc123"),
        ))
        .unwrap();
        let headers = profile.auth_headers();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers["Authorization"], "Bearer abc123");
        assert_eq!(headers["Accept"], "application/json");
        assert_eq!(headers["Content-Type"], "application/json");
    }

    #[test]
    fn debug_output_redacts_token() {
        let profile = build_profile(&zephyr_config(
            Some("https://jira.internal.acme.com"),
            Some("very-secret-token"),
        ))
        .unwrap();
        let rendered = format!("{profile:?}");
        assert!(!rendered.contains("very-secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
