//! MCP resources: local files, live test cases and payload examples.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::backend::{check_key, BackendProfile, Resource};
use crate::error::{KeyError, ResourceError};
use crate::gherkin;
use crate::mcp::protocol::{ErrorCode, JsonRpcError, JsonRpcErrorData, RequestId};
use crate::zephyr::{ApiRequest, ZephyrApi};

const FILE_SCHEME: &str = "file://";
const TEST_CASE_PREFIX: &str = "zephyr://testcase/";
const STEP_BY_STEP_EXAMPLE: &str = "zephyr://examples/step-by-step-payload";
const BDD_EXAMPLE: &str = "zephyr://examples/bdd-test-case-payload";
const GHERKIN_EXAMPLE: &str = "zephyr://examples/gherkin-conversion";

const GHERKIN_EXAMPLE_INPUT: &str = "**Given** a user with valid credentials
**When** the user attempts to log in
**Then** the user should be authenticated successfully";

const BDD_EXAMPLE_INPUT: &str = "**Given** I am a new user who has not accepted the privacy policy
**And** I navigate to the application
**When** I attempt to access the main features
**Then** I should see the Privacy Policy modal
**And** the modal should have an 'Accept' button
**When** I click the 'Accept' button
**Then** the Privacy Policy modal should close
**And** my acceptance should be recorded in the system";

/// A resource entry for resources/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    /// Resource URI or URI prefix.
    pub uri: String,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// MIME type of the content.
    pub mime_type: String,
}

/// Parameters for resources/read request.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceReadParams {
    /// URI to read.
    pub uri: String,
}

/// Content of a read resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    /// URI that was read.
    pub uri: String,
    /// MIME type of `text`.
    pub mime_type: String,
    /// The content.
    pub text: String,
}

impl ResourceError {
    /// Converts the error into a JSON-RPC error response for `id`.
    #[must_use]
    pub fn into_rpc_error(self, id: RequestId) -> JsonRpcError {
        let code = match self {
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::Failed { .. } => ErrorCode::InternalError,
        };
        JsonRpcError::new(
            Some(id),
            JsonRpcErrorData::with_message(code, self.to_string()),
        )
    }
}

fn definition(uri: &str, name: &str, description: &str, mime_type: &str) -> ResourceDefinition {
    ResourceDefinition {
        uri: uri.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        mime_type: mime_type.to_string(),
    }
}

/// Returns the MIME type for a file based on its extension.
#[must_use]
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("json") => "application/json",
        Some("yaml" | "yml") => "application/yaml",
        Some("xml") => "application/xml",
        Some("html") => "text/html",
        Some("md") => "text/markdown",
        Some("js") => "application/javascript",
        Some("ts") => "application/typescript",
        _ => "text/plain",
    }
}

/// Resolves `path` and checks it lies within one of `allowed_paths`.
///
/// An empty allow-list stands for the current working directory. Returns
/// the canonical path.
///
/// # Errors
///
/// Returns an error message if the path cannot be resolved or is outside
/// every allowed directory.
pub fn validate_path(allowed_paths: &[PathBuf], path: &Path) -> Result<PathBuf, String> {
    let canonical_path = path
        .canonicalize()
        .map_err(|e| format!("Failed to resolve path '{}': {e}", path.display()))?;

    let working_dir = [PathBuf::from(".")];
    let allowed_paths = if allowed_paths.is_empty() {
        &working_dir[..]
    } else {
        allowed_paths
    };

    for allowed in allowed_paths {
        let Ok(canonical_allowed) = allowed.canonicalize() else {
            continue; // Skip non-existent allowed paths
        };

        if canonical_path.starts_with(&canonical_allowed) {
            return Ok(canonical_path);
        }
    }

    // Don't echo internal paths back to the client
    Err("Access denied: path is outside the configured allowed directories".to_string())
}

/// Resource handlers bound to one backend and file allow-list.
#[derive(Clone)]
pub struct ResourceHandlers {
    profile: Arc<BackendProfile>,
    api: Arc<dyn ZephyrApi>,
    allowed_paths: Vec<PathBuf>,
}

impl std::fmt::Debug for ResourceHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandlers")
            .field("profile", &self.profile)
            .field("allowed_paths", &self.allowed_paths)
            .finish_non_exhaustive()
    }
}

impl ResourceHandlers {
    /// Creates resource handlers.
    #[must_use]
    pub fn new(
        profile: Arc<BackendProfile>,
        api: Arc<dyn ZephyrApi>,
        allowed_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            profile,
            api,
            allowed_paths,
        }
    }

    /// Returns the list of available resources.
    #[must_use]
    pub fn definitions() -> Vec<ResourceDefinition> {
        vec![
            definition(
                FILE_SCHEME,
                "File System Access",
                "Read local files containing test case examples, payloads or templates. \
                 Use file:// followed by an absolute path inside the allowed directories \
                 (e.g., file:///home/user/examples/test-payload.json)",
                "application/octet-stream",
            ),
            definition(
                TEST_CASE_PREFIX,
                "Live Test Case Data",
                "Fetch test case data from Zephyr Scale. Use zephyr://testcase/TEST-KEY \
                 (e.g., zephyr://testcase/PROJ-T123)",
                "application/json",
            ),
            definition(
                STEP_BY_STEP_EXAMPLE,
                "Step-by-Step Test Case - Request Payload Example",
                "Example payload for creating a step-by-step test case",
                "application/json",
            ),
            definition(
                BDD_EXAMPLE,
                "BDD Test Case - Request Payload Example",
                "Example payload for creating a BDD test case",
                "application/json",
            ),
            definition(
                GHERKIN_EXAMPLE,
                "BDD Content Conversion Example",
                "Shows how BDD content is converted from markdown to Gherkin format",
                "text/plain",
            ),
        ]
    }

    /// Reads a resource by URI.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidRequest`] for unknown, incomplete or
    /// disallowed URIs and [`ResourceError::Failed`] when the file or
    /// backend read fails.
    pub async fn read(&self, uri: &str) -> Result<Vec<ResourceContent>, ResourceError> {
        tracing::debug!(uri, "Reading resource");

        if let Some(path) = uri.strip_prefix(FILE_SCHEME) {
            return self.read_file(uri, path).await;
        }
        if let Some(key) = uri.strip_prefix(TEST_CASE_PREFIX) {
            return self.read_test_case(uri, key).await;
        }

        let content = match uri {
            STEP_BY_STEP_EXAMPLE => json_content(uri, &self.step_by_step_example()),
            BDD_EXAMPLE => json_content(uri, &self.bdd_example()),
            GHERKIN_EXAMPLE => ResourceContent {
                uri: uri.to_string(),
                mime_type: "text/plain".to_string(),
                text: gherkin_example(),
            },
            _ => {
                return Err(ResourceError::InvalidRequest(format!(
                    "Unknown resource: {uri}"
                )))
            }
        };
        Ok(vec![content])
    }

    async fn read_file(&self, uri: &str, path: &str) -> Result<Vec<ResourceContent>, ResourceError> {
        const ACTION: &str = "read file";

        if path.is_empty() {
            return Err(ResourceError::InvalidRequest(
                "File path is required. Use format: file:///absolute/path".to_string(),
            ));
        }

        let path = Path::new(path);
        let canonical = validate_path(&self.allowed_paths, path).map_err(|message| {
            tracing::warn!(uri, "Rejected file resource");
            ResourceError::InvalidRequest(message)
        })?;

        let text = tokio::fs::read_to_string(&canonical)
            .await
            .map_err(|e| ResourceError::Failed {
                action: ACTION,
                message: e.to_string(),
            })?;

        Ok(vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: mime_type_for(path).to_string(),
            text,
        }])
    }

    async fn read_test_case(
        &self,
        uri: &str,
        key: &str,
    ) -> Result<Vec<ResourceContent>, ResourceError> {
        const ACTION: &str = "fetch test case";

        let key = match check_key(key) {
            Ok(key) => key,
            Err(KeyError::Empty) => {
                return Err(ResourceError::InvalidRequest(
                    "Test case key is required. Use format: zephyr://testcase/TEST-KEY"
                        .to_string(),
                ))
            }
            Err(e) => {
                return Err(ResourceError::InvalidRequest(format!(
                    "Invalid test case key: {e}"
                )))
            }
        };

        let path = self.profile.endpoints().path_for(Resource::TestCase, key);
        let response = self
            .api
            .send(ApiRequest::get(path))
            .await
            .map_err(|e| ResourceError::Failed {
                action: ACTION,
                message: if e.is_not_found() {
                    format!("Test case not found: {key}")
                } else {
                    e.to_string()
                },
            })?;

        let wrapped = json!({
            "description": format!("Live test case data for {key} retrieved from Zephyr Scale"),
            "testCaseKey": key,
            "retrievedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "data": response.body,
        });
        Ok(vec![json_content(uri, &wrapped)])
    }

    fn create_endpoint(&self) -> String {
        format!("POST {}", self.profile.endpoints().path(Resource::TestCases))
    }

    fn step_by_step_example(&self) -> Value {
        json!({
            "description": "Example payload for creating a step-by-step test case",
            "endpoint": self.create_endpoint(),
            "payload": {
                "projectKey": "PROJ",
                "name": "User Login Test",
                "status": "Draft",
                "priority": "High",
                "folder": "/ProjectName/Authentication",
                "customFields": {
                    "Type": "Functional",
                    "Priority": "P0"
                },
                "testScript": {
                    "type": "STEP_BY_STEP",
                    "steps": [
                        {
                            "description": "Navigate to login page",
                            "testData": "URL: https://example.com/login",
                            "expectedResult": "Login page is displayed with username and password fields"
                        },
                        {
                            "description": "Enter valid credentials",
                            "testData": "Username: testuser@example.com, Password: validpassword123",
                            "expectedResult": "Credentials are entered successfully"
                        },
                        {
                            "description": "Click login button",
                            "expectedResult": "User is logged in and redirected to dashboard"
                        }
                    ]
                }
            }
        })
    }

    fn bdd_example(&self) -> Value {
        json!({
            "description": "Example payload sent to Zephyr Scale for BDD test case creation",
            "endpoint": self.create_endpoint(),
            "payload": {
                "projectKey": "PROJ",
                "name": "User Authentication with Privacy Policy",
                "status": "Draft",
                "priority": "High",
                "folder": "/ProjectName/Authentication/Login Features",
                "precondition": "User has not accepted privacy policy and application is available",
                "objective": "Verify that new users see and can accept privacy policy before proceeding",
                "issueLinks": ["PROJ-123"],
                "customFields": {
                    "Type": "Functional",
                    "Regression": false,
                    "Execution Type": "Manual"
                },
                "testScript": {
                    "type": "BDD",
                    "text": gherkin::convert(BDD_EXAMPLE_INPUT)
                }
            }
        })
    }
}

fn json_content(uri: &str, value: &Value) -> ResourceContent {
    ResourceContent {
        uri: uri.to_string(),
        mime_type: "application/json".to_string(),
        text: serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    }
}

fn gherkin_example() -> String {
    let keywords = gherkin::KEYWORDS
        .iter()
        .map(|kw| format!("- **{kw}** -> {kw}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "BDD Content Conversion Example

Markdown-style BDD content is converted to Gherkin before it is sent to Zephyr Scale.

INPUT (Markdown style):
{GHERKIN_EXAMPLE_INPUT}

OUTPUT (Gherkin format with indentation):
{}

SUPPORTED KEYWORDS:
{keywords}

The converter:
1. Removes markdown bold markers around the keyword
2. Keeps plain keyword lines as they are
3. Indents every step by four spaces
4. Drops empty lines, separators (---) and any other text
",
        gherkin::convert(GHERKIN_EXAMPLE_INPUT)
    )
}
