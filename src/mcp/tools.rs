//! Zephyr Scale tools exposed over MCP.
//!
//! Each tool deserialises its arguments, builds a payload, makes one or
//! more backend calls through [`ZephyrApi`] and renders a text result.
//! Failures are returned as [`ToolError`] and surface to the client as
//! JSON-RPC errors.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::backend::{check_key, BackendProfile, Resource};
use crate::error::{ToolError, ZephyrError};
use crate::gherkin;
use crate::mcp::protocol::{ErrorCode, JsonRpcError, JsonRpcErrorData, RequestId};
use crate::zephyr::payload::{
    self, AddTestCasesToRunArgs, BddTestCaseArgs, FolderArgs, ScriptType, SearchTestCasesArgs,
    TestCaseArgs, TestExecutionArgs, TestRunArgs, UpdateBddArgs,
};
use crate::zephyr::{ApiRequest, ApiResponse, ZephyrApi};

/// Number of execution ids reported per run when a lookup misses.
const EXECUTION_ID_PREVIEW: usize = 5;

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a successful tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Creates a text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }

    /// Returns the first text item.
    #[must_use]
    pub fn first_text(&self) -> &str {
        match self.content.first() {
            Some(ToolContent::Text { text }) => text,
            None => "",
        }
    }
}

impl ToolError {
    /// Converts the error into a JSON-RPC error response for `id`.
    #[must_use]
    pub fn into_rpc_error(self, id: RequestId) -> JsonRpcError {
        match self {
            Self::InvalidParams(message) => JsonRpcError::invalid_params(id, message),
            Self::UnknownTool(_) => JsonRpcError::new(
                Some(id),
                JsonRpcErrorData::with_message(ErrorCode::MethodNotFound, self.to_string()),
            ),
            Self::Failed { .. } => JsonRpcError::internal_error(id, self.to_string()),
        }
    }
}

/// How `add_test_cases_to_run` managed to update the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunUpdateStrategy {
    PutMinimal,
    PostTestCases,
    PutFull,
}

impl RunUpdateStrategy {
    const fn as_str(self) -> &'static str {
        match self {
            Self::PutMinimal => "PUT-minimal",
            Self::PostTestCases => "POST-testcases",
            Self::PutFull => "PUT-full",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TestCaseKeyArgs {
    test_case_key: String,
}

#[derive(Debug, Deserialize)]
struct TestRunKeyArgs {
    test_run_key: String,
}

fn parse_args<T: DeserializeOwned>(arguments: &Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments.clone()
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidParams(format!("Invalid arguments: {e}")))
}

fn require_key<'a>(value: &'a str, field: &str) -> Result<&'a str, ToolError> {
    check_key(value).map_err(|e| ToolError::InvalidParams(format!("{field} {e}")))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Renders a response field for a message, `Unknown` when absent.
fn field_text(body: &Value, field: &str) -> String {
    match body.get(field) {
        None | Some(Value::Null) => "Unknown".to_string(),
        Some(value) => payload::id_string(value),
    }
}

/// Maps a 404 to `not_found`, anything else to the backend message.
fn not_found_or(action: &'static str, error: &ZephyrError, not_found: String) -> ToolError {
    if error.is_not_found() {
        ToolError::Failed {
            action,
            message: not_found,
        }
    } else {
        ToolError::backend(action, error)
    }
}

/// Tool handlers bound to one backend.
#[derive(Clone)]
pub struct ToolHandlers {
    profile: Arc<BackendProfile>,
    api: Arc<dyn ZephyrApi>,
}

impl std::fmt::Debug for ToolHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolHandlers")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl ToolHandlers {
    /// Creates handlers sending requests through `api`.
    #[must_use]
    pub fn new(profile: Arc<BackendProfile>, api: Arc<dyn ZephyrApi>) -> Self {
        Self { profile, api }
    }

    fn path(&self, resource: Resource) -> String {
        self.profile.endpoints().path(resource)
    }

    fn path_for(&self, resource: Resource, key: &str) -> String {
        self.profile.endpoints().path_for(resource, key)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ZephyrError> {
        self.api.send(request).await
    }

    /// Dispatches a tool call by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for unknown names,
    /// [`ToolError::InvalidParams`] for bad arguments and
    /// [`ToolError::Failed`] when the backend call fails.
    pub async fn call(&self, name: &str, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        tracing::debug!(tool = name, "Calling tool");

        let result = match name {
            "get_test_case" => self.get_test_case(arguments).await,
            "create_test_case" => self.create_test_case(arguments).await,
            "create_test_case_with_bdd" => self.create_test_case_with_bdd(arguments).await,
            "update_test_case_bdd" => self.update_test_case_bdd(arguments).await,
            "create_folder" => self.create_folder(arguments).await,
            "get_test_run_cases" => self.get_test_run_cases(arguments).await,
            "delete_test_case" => self.delete_test_case(arguments).await,
            "create_test_run" => self.create_test_run(arguments).await,
            "get_test_run" => self.get_test_run(arguments).await,
            "get_test_execution" => self.get_test_execution(arguments).await,
            "search_test_cases_by_folder" => self.search_test_cases_by_folder(arguments).await,
            "add_test_cases_to_run" => self.add_test_cases_to_run(arguments).await,
            _ => Err(ToolError::UnknownTool(name.to_string())),
        };

        if let Err(ref e) = result {
            tracing::warn!(tool = name, error = %e, "Tool call failed");
        }
        result
    }

    async fn get_test_case(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "get test case";
        let args: TestCaseKeyArgs = parse_args(arguments)?;
        let key = require_key(&args.test_case_key, "test_case_key")?;

        let response = self
            .send(ApiRequest::get(self.path_for(Resource::TestCase, key)))
            .await
            .map_err(|e| ToolError::backend(ACTION, &e))?;

        Ok(ToolCallResult::text(pretty(&response.body)))
    }

    async fn create_test_case(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "create test case";
        let args: TestCaseArgs = parse_args(arguments)?;

        let response = self
            .send(ApiRequest::post(
                self.path(Resource::TestCases),
                payload::test_case_payload(&args),
            ))
            .await
            .map_err(|e| ToolError::backend(ACTION, &e))?;

        let key = field_text(&response.body, "key");
        let mut summary = json!({
            "key": key,
            "type": args
                .test_script
                .as_ref()
                .map_or("none", |s| s.script_type.as_str()),
        });
        if let Some(ref script) = args.test_script {
            match script.script_type {
                ScriptType::StepByStep => {
                    summary["hasSteps"] = json!(script.steps.as_ref().map_or(0, Vec::len));
                }
                ScriptType::PlainText | ScriptType::Bdd => {
                    summary["hasText"] =
                        json!(script.text.as_ref().is_some_and(|t| !t.is_empty()));
                }
            }
        }

        Ok(ToolCallResult::text(format!(
            "Test case created successfully: {key}\n{}",
            pretty(&summary)
        )))
    }

    async fn create_test_case_with_bdd(
        &self,
        arguments: &Value,
    ) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "create test case";
        let args: BddTestCaseArgs = parse_args(arguments)?;

        let dropped = gherkin::unrecognized_lines(&args.bdd_content).len();
        if dropped > 0 {
            tracing::debug!(dropped, "BDD content has lines that are not Gherkin steps");
        }

        let body = payload::bdd_test_case_payload(&args);
        let steps = body["testScript"]["text"]
            .as_str()
            .map_or(0, |text| text.lines().count());

        let response = self
            .send(ApiRequest::post(self.path(Resource::TestCases), body))
            .await
            .map_err(|e| ToolError::backend(ACTION, &e))?;

        let key = field_text(&response.body, "key");
        let summary = json!({
            "key": key,
            "type": ScriptType::Bdd.as_str(),
            "steps": steps,
        });

        Ok(ToolCallResult::text(format!(
            "Test case created successfully: {key}\n{}",
            pretty(&summary)
        )))
    }

    async fn update_test_case_bdd(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "update test case BDD";
        let args: UpdateBddArgs = parse_args(arguments)?;
        let key = require_key(&args.test_case_key, "test_case_key")?;
        let path = self.path_for(Resource::TestCase, key);

        self.send(ApiRequest::get(path.clone()))
            .await
            .map_err(|e| not_found_or(ACTION, &e, format!("Test case {key} not found")))?;

        let dropped = gherkin::unrecognized_lines(&args.bdd_content).len();
        if dropped > 0 {
            tracing::debug!(dropped, "BDD content has lines that are not Gherkin steps");
        }

        self.send(ApiRequest::put(
            path,
            payload::bdd_update_payload(&args.bdd_content),
        ))
        .await
        .map_err(|e| ToolError::backend(ACTION, &e))?;

        Ok(ToolCallResult::text(format!(
            "Updated {key} with BDD content successfully"
        )))
    }

    async fn create_folder(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "create folder";
        let args: FolderArgs = parse_args(arguments)?;

        let response = self
            .send(ApiRequest::post(
                self.path(Resource::Folders),
                payload::folder_payload(&args),
            ))
            .await
            .map_err(|e| ToolError::backend(ACTION, &e))?;

        Ok(ToolCallResult::text(format!(
            "Folder created successfully: {} (ID: {})\n{}",
            field_text(&response.body, "name"),
            field_text(&response.body, "id"),
            pretty(&response.body)
        )))
    }

    async fn get_test_run_cases(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "get test run cases";
        let args: TestRunKeyArgs = parse_args(arguments)?;
        let key = require_key(&args.test_run_key, "test_run_key")?;

        let response = self
            .send(ApiRequest::get(self.path_for(Resource::TestRun, key)))
            .await
            .map_err(|e| not_found_or(ACTION, &e, format!("Test run {key} not found")))?;

        let items = response
            .body
            .get("items")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);

        Ok(ToolCallResult::text(format!(
            "Retrieved test cases from {key}:\nTest Case Keys: {}\nStatuses: {}\nRun IDs: {}",
            pretty(&Value::Array(payload::pluck(items, "testCaseKey"))),
            pretty(&Value::Array(payload::pluck(items, "status"))),
            pretty(&Value::Array(payload::pluck(items, "id"))),
        )))
    }

    async fn delete_test_case(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "delete test case";
        let args: TestCaseKeyArgs = parse_args(arguments)?;
        let key = require_key(&args.test_case_key, "test_case_key")?;

        self.send(ApiRequest::delete(self.path_for(Resource::TestCase, key)))
            .await
            .map_err(|e| not_found_or(ACTION, &e, format!("Test case {key} not found")))?;

        Ok(ToolCallResult::text(format!(
            "Test case {key} deleted successfully"
        )))
    }

    async fn create_test_run(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "create test run";
        let args: TestRunArgs = parse_args(arguments)?;

        let response = self
            .send(ApiRequest::post(
                self.path(Resource::TestRuns),
                payload::test_run_payload(&args),
            ))
            .await
            .map_err(|e| ToolError::backend(ACTION, &e))?;

        let key = field_text(&response.body, "key");
        let summary = json!({
            "key": key,
            "name": args.name,
            "testCaseCount": args.test_case_keys.as_ref().map_or(0, Vec::len),
            "environment": args
                .environment
                .as_deref()
                .filter(|e| !e.is_empty())
                .unwrap_or("Not specified"),
        });

        Ok(ToolCallResult::text(format!(
            "Test run created successfully: {key}\n{}",
            pretty(&summary)
        )))
    }

    async fn get_test_run(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "get test run";
        let args: TestRunKeyArgs = parse_args(arguments)?;
        let key = require_key(&args.test_run_key, "test_run_key")?;

        let response = self
            .send(ApiRequest::get(self.path_for(Resource::TestRun, key)))
            .await
            .map_err(|e| not_found_or(ACTION, &e, format!("Test run {key} not found")))?;

        Ok(ToolCallResult::text(pretty(&response.body)))
    }

    async fn get_test_execution(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "get test execution";
        let args: TestExecutionArgs = parse_args(arguments)?;
        let execution_id = args.execution_id();

        let run_keys = args
            .test_run_keys
            .as_deref()
            .filter(|keys| !keys.is_empty())
            .ok_or_else(|| {
                ToolError::InvalidParams(
                    "test_run_keys is required. Please provide an array of test run keys to \
                     search in (e.g., [\"PROJ-C152\", \"PROJ-C161\"]). Use get_test_run_cases \
                     to find test runs if needed."
                        .to_string(),
                )
            })?
            .iter()
            .map(|key| require_key(key, "test_run_keys entry"))
            .collect::<Result<Vec<_>, _>>()?;

        let mut searched = Vec::with_capacity(run_keys.len());
        for run_key in &run_keys {
            let path = self.path_for(Resource::TestRunResults, run_key);
            let response = match self.send(ApiRequest::get(path)).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(run = %run_key, error = %e, "Skipping test run");
                    searched.push(json!({ "testRunKey": run_key, "error": e.to_string() }));
                    continue;
                }
            };

            let results = match response.body {
                Value::Array(results) => results,
                Value::Null => Vec::new(),
                single => vec![single],
            };

            let found = results.iter().find(|result| {
                result
                    .get("id")
                    .filter(|id| !id.is_null())
                    .is_some_and(|id| payload::id_string(id) == execution_id)
            });
            if let Some(execution) = found {
                return Ok(ToolCallResult::text(format!(
                    "Test execution {execution_id} found in {run_key}:\n{}",
                    pretty(execution)
                )));
            }

            let ids: Vec<Value> = payload::pluck(&results, "id")
                .into_iter()
                .take(EXECUTION_ID_PREVIEW)
                .collect();
            searched.push(json!({
                "testRunKey": run_key,
                "executionCount": results.len(),
                "executionIds": ids,
            }));
        }

        Err(ToolError::Failed {
            action: ACTION,
            message: format!(
                "Test execution {execution_id} not found in any of the {} test runs searched. \
                 Search results: {}",
                run_keys.len(),
                pretty(&Value::Array(searched))
            ),
        })
    }

    async fn search_test_cases_by_folder(
        &self,
        arguments: &Value,
    ) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "search test cases by folder";
        let args: SearchTestCasesArgs = parse_args(arguments)?;

        let request = ApiRequest::get(self.path(Resource::TestCaseSearch))
            .with_query(
                "query",
                payload::folder_search_query(&args.project_key, &args.folder_path),
            )
            .with_query("maxResults", args.max_results.to_string());

        let response = self.send(request).await.map_err(|e| {
            not_found_or(
                ACTION,
                &e,
                format!(
                    "Folder \"{}\" not found or no test cases found",
                    args.folder_path
                ),
            )
        })?;

        let keys = payload::search_result_keys(&response.body);
        let summary = json!({
            "folder": args.folder_path,
            "testCaseKeys": keys,
            "totalCount": keys.len(),
        });

        Ok(ToolCallResult::text(format!(
            "Found {} test cases in folder \"{}\":\n{}",
            keys.len(),
            args.folder_path,
            pretty(&summary)
        )))
    }

    async fn add_test_cases_to_run(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        const ACTION: &str = "add test cases to run";
        let args: AddTestCasesToRunArgs = parse_args(arguments)?;
        let key = require_key(&args.test_run_key, "test_run_key")?;
        let not_found = || format!("Test run {key} not found");

        let run_path = self.path_for(Resource::TestRun, key);
        let current = self
            .send(ApiRequest::get(run_path.clone()))
            .await
            .map_err(|e| not_found_or(ACTION, &e, not_found()))?
            .body;

        let existing = current
            .get("items")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);
        let merged = payload::merge_run_items(existing, &args.test_case_keys);

        let strategy = self
            .update_run_items(key, &run_path, &current, &merged.items, &args.test_case_keys)
            .await
            .map_err(|e| not_found_or(ACTION, &e, not_found()))?;

        let summary = json!({
            "testRunKey": key,
            "addedTestCases": args.test_case_keys,
            "uniqueNewCases": merged.added,
            "totalTestCases": merged.items.len(),
            "method": strategy.as_str(),
        });

        Ok(ToolCallResult::text(format!(
            "Successfully added {} test cases to {key} using {}:\n{}",
            merged.added,
            strategy.as_str(),
            pretty(&summary)
        )))
    }

    /// Tries each way of updating a run's items until one succeeds.
    ///
    /// Returns the last error if every strategy fails.
    async fn update_run_items(
        &self,
        key: &str,
        run_path: &str,
        current: &Value,
        items: &[Value],
        test_case_keys: &[String],
    ) -> Result<RunUpdateStrategy, ZephyrError> {
        let minimal = ApiRequest::put(
            run_path,
            payload::minimal_run_update_payload(current, items),
        );
        match self.send(minimal).await {
            Ok(_) => return Ok(RunUpdateStrategy::PutMinimal),
            Err(e) => tracing::debug!(run = key, error = %e, "Minimal run update rejected"),
        }

        let append = ApiRequest::post(
            self.path_for(Resource::TestRunTestCases, key),
            Value::Array(payload::run_items(test_case_keys)),
        );
        match self.send(append).await {
            Ok(_) => return Ok(RunUpdateStrategy::PostTestCases),
            Err(e) => tracing::debug!(run = key, error = %e, "Test case append rejected"),
        }

        let full = ApiRequest::put(
            run_path,
            payload::full_run_update_payload(current, items),
        );
        self.send(full).await?;
        Ok(RunUpdateStrategy::PutFull)
    }

    /// Returns the list of available tools.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            // === Test cases ===
            ToolDefinition {
                name: "get_test_case".to_string(),
                description: Some("Get detailed information about a specific test case".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "test_case_key": {
                            "type": "string",
                            "description": "Test case key (e.g., PROJ-T123)"
                        }
                    },
                    "required": ["test_case_key"]
                }),
            },
            ToolDefinition {
                name: "create_test_case".to_string(),
                description: Some(
                    "Create a new test case. The optional test script can be STEP_BY_STEP \
                     (steps), PLAIN_TEXT (text) or BDD (markdown text converted to Gherkin)."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "project_key": { "type": "string", "description": "Project key" },
                        "name": { "type": "string", "description": "Test case name" },
                        "test_script": {
                            "type": "object",
                            "description": "Test script",
                            "properties": {
                                "type": {
                                    "type": "string",
                                    "enum": ["STEP_BY_STEP", "PLAIN_TEXT", "BDD"]
                                },
                                "steps": {
                                    "type": "array",
                                    "description": "Steps for STEP_BY_STEP",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "description": { "type": "string" },
                                            "testData": { "type": "string" },
                                            "expectedResult": { "type": "string" },
                                            "testCaseKey": { "type": "string" }
                                        }
                                    }
                                },
                                "text": {
                                    "type": "string",
                                    "description": "Text for PLAIN_TEXT or BDD"
                                }
                            },
                            "required": ["type"]
                        },
                        "folder": { "type": "string", "description": "Folder path" },
                        "status": {
                            "type": "string",
                            "enum": ["Draft", "Approved", "Deprecated"]
                        },
                        "priority": {
                            "type": "string",
                            "enum": ["High", "Medium", "Low"]
                        },
                        "precondition": { "type": "string" },
                        "objective": { "type": "string" },
                        "component": { "type": "string" },
                        "owner": { "type": "string" },
                        "estimated_time": {
                            "type": "integer",
                            "minimum": 0,
                            "description": "Estimated time in milliseconds"
                        },
                        "labels": { "type": "array", "items": { "type": "string" } },
                        "issue_links": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Linked Jira issue keys"
                        },
                        "custom_fields": { "type": "object" },
                        "parameters": { "type": "object" }
                    },
                    "required": ["project_key", "name"]
                }),
            },
            ToolDefinition {
                name: "create_test_case_with_bdd".to_string(),
                description: Some("Create a new test case with BDD content".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "project_key": { "type": "string", "description": "Project key" },
                        "name": { "type": "string", "description": "Test case name" },
                        "bdd_content": {
                            "type": "string",
                            "description": "BDD content in markdown format (**Given** ...)"
                        },
                        "folder": { "type": "string", "description": "Folder path" },
                        "priority": {
                            "type": "string",
                            "enum": ["High", "Medium", "Low"]
                        }
                    },
                    "required": ["project_key", "name", "bdd_content"]
                }),
            },
            ToolDefinition {
                name: "update_test_case_bdd".to_string(),
                description: Some("Replace the test script of a test case with BDD content".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "test_case_key": { "type": "string", "description": "Test case key" },
                        "bdd_content": {
                            "type": "string",
                            "description": "BDD content in markdown format"
                        }
                    },
                    "required": ["test_case_key", "bdd_content"]
                }),
            },
            ToolDefinition {
                name: "delete_test_case".to_string(),
                description: Some("Delete a specific test case".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "test_case_key": {
                            "type": "string",
                            "description": "Test case key to delete (e.g., PROJ-T123)"
                        }
                    },
                    "required": ["test_case_key"]
                }),
            },
            ToolDefinition {
                name: "search_test_cases_by_folder".to_string(),
                description: Some("Search for test cases in a specific folder".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "project_key": { "type": "string", "description": "Project key" },
                        "folder_path": {
                            "type": "string",
                            "description": "Folder path (e.g., /2025 Releases/Login)"
                        },
                        "max_results": {
                            "type": "integer",
                            "minimum": 1,
                            "default": payload::DEFAULT_MAX_RESULTS
                        }
                    },
                    "required": ["project_key", "folder_path"]
                }),
            },
            // === Folders ===
            ToolDefinition {
                name: "create_folder".to_string(),
                description: Some("Create a new folder in Zephyr Scale".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "project_key": { "type": "string", "description": "Project key" },
                        "name": {
                            "type": "string",
                            "description": "Folder name, or an absolute path starting with /"
                        },
                        "parent_folder_path": {
                            "type": "string",
                            "description": "Parent folder path"
                        },
                        "folder_type": {
                            "type": "string",
                            "enum": ["TEST_CASE", "TEST_PLAN", "TEST_RUN"],
                            "default": "TEST_CASE"
                        }
                    },
                    "required": ["project_key", "name"]
                }),
            },
            // === Test runs ===
            ToolDefinition {
                name: "create_test_run".to_string(),
                description: Some("Create a new test run".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "project_key": { "type": "string", "description": "Project key" },
                        "name": { "type": "string", "description": "Test run name" },
                        "test_case_keys": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Test cases to include"
                        },
                        "test_plan_key": { "type": "string" },
                        "folder": { "type": "string" },
                        "planned_start_date": {
                            "type": "string",
                            "description": "ISO-8601 date-time"
                        },
                        "planned_end_date": {
                            "type": "string",
                            "description": "ISO-8601 date-time"
                        },
                        "description": { "type": "string" },
                        "owner": { "type": "string" },
                        "environment": { "type": "string" },
                        "custom_fields": { "type": "object" }
                    },
                    "required": ["project_key", "name"]
                }),
            },
            ToolDefinition {
                name: "get_test_run".to_string(),
                description: Some("Get detailed information about a specific test run".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "test_run_key": {
                            "type": "string",
                            "description": "Test run key (e.g., PROJ-C123)"
                        }
                    },
                    "required": ["test_run_key"]
                }),
            },
            ToolDefinition {
                name: "get_test_run_cases".to_string(),
                description: Some(
                    "Get the test case keys, statuses and result ids of a test run".to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "test_run_key": {
                            "type": "string",
                            "description": "Test run key (e.g., PROJ-C123)"
                        }
                    },
                    "required": ["test_run_key"]
                }),
            },
            ToolDefinition {
                name: "add_test_cases_to_run".to_string(),
                description: Some("Add test cases to an existing test run".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "test_run_key": { "type": "string", "description": "Test run key" },
                        "test_case_keys": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Test cases to add"
                        }
                    },
                    "required": ["test_run_key", "test_case_keys"]
                }),
            },
            ToolDefinition {
                name: "get_test_execution".to_string(),
                description: Some(
                    "Find a test execution by id within the given test runs".to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "execution_id": {
                            "type": ["string", "integer"],
                            "description": "Test execution id (e.g., 5805255)"
                        },
                        "test_run_keys": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": 1,
                            "description": "Test runs to search (e.g., [\"PROJ-C152\"])"
                        }
                    },
                    "required": ["execution_id", "test_run_keys"]
                }),
            },
        ]
    }
}
