//! Tool arguments and their Zephyr Scale request payloads.
//!
//! Argument structs deserialise straight from the `tools/call` arguments
//! (snake_case). Payload builders are pure and produce the camelCase JSON
//! bodies the REST API expects. Optional fields are only emitted when set
//! and non-empty.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::gherkin;

/// Default page size for folder searches.
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Test run fields the backend rejects on update.
pub const READ_ONLY_RUN_FIELDS: [&str; 9] = [
    "key",
    "createdOn",
    "createdBy",
    "executionTime",
    "estimatedTime",
    "testCaseCount",
    "issueCount",
    "executionSummary",
    "status",
];

/// Kind of test script attached to a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptType {
    /// Ordered steps with test data and expected result.
    StepByStep,
    /// Free text.
    PlainText,
    /// Gherkin text.
    Bdd,
}

impl ScriptType {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StepByStep => "STEP_BY_STEP",
            Self::PlainText => "PLAIN_TEXT",
            Self::Bdd => "BDD",
        }
    }
}

/// One step of a `STEP_BY_STEP` script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    /// What to do.
    #[serde(default)]
    pub description: Option<String>,
    /// Input data.
    #[serde(default)]
    pub test_data: Option<String>,
    /// What should happen.
    #[serde(default)]
    pub expected_result: Option<String>,
    /// Calls another test case as this step.
    #[serde(default)]
    pub test_case_key: Option<String>,
}

/// Test script argument of `create_test_case`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestScriptArgs {
    /// Script kind.
    #[serde(rename = "type")]
    pub script_type: ScriptType,
    /// Steps for `STEP_BY_STEP`.
    #[serde(default)]
    pub steps: Option<Vec<TestStep>>,
    /// Text for `PLAIN_TEXT` and `BDD`.
    #[serde(default)]
    pub text: Option<String>,
}

/// Arguments of `create_test_case`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseArgs {
    /// Project key.
    pub project_key: String,
    /// Test case name.
    pub name: String,
    /// Optional test script.
    #[serde(default)]
    pub test_script: Option<TestScriptArgs>,
    /// Folder path.
    #[serde(default)]
    pub folder: Option<String>,
    /// Status name.
    #[serde(default)]
    pub status: Option<String>,
    /// Priority name.
    #[serde(default)]
    pub priority: Option<String>,
    /// Precondition text.
    #[serde(default)]
    pub precondition: Option<String>,
    /// Objective text.
    #[serde(default)]
    pub objective: Option<String>,
    /// Component name.
    #[serde(default)]
    pub component: Option<String>,
    /// Owner.
    #[serde(default)]
    pub owner: Option<String>,
    /// Estimated time in milliseconds.
    #[serde(default)]
    pub estimated_time: Option<u64>,
    /// Labels.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    /// Linked Jira issue keys.
    #[serde(default)]
    pub issue_links: Option<Vec<String>>,
    /// Custom fields, passed through.
    #[serde(default)]
    pub custom_fields: Option<Map<String, Value>>,
    /// Test data parameters, passed through.
    #[serde(default)]
    pub parameters: Option<Value>,
}

/// Arguments of `create_test_case_with_bdd`.
#[derive(Debug, Clone, Deserialize)]
pub struct BddTestCaseArgs {
    /// Project key.
    pub project_key: String,
    /// Test case name.
    pub name: String,
    /// Markdown BDD text.
    pub bdd_content: String,
    /// Folder path.
    #[serde(default)]
    pub folder: Option<String>,
    /// Priority name.
    #[serde(default)]
    pub priority: Option<String>,
}

/// Arguments of `update_test_case_bdd`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBddArgs {
    /// Test case to update.
    pub test_case_key: String,
    /// Markdown BDD text.
    pub bdd_content: String,
}

/// Arguments of `create_folder`.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderArgs {
    /// Project key.
    pub project_key: String,
    /// Folder name or absolute path.
    pub name: String,
    /// Parent folder path.
    #[serde(default)]
    pub parent_folder_path: Option<String>,
    /// Folder kind.
    #[serde(default)]
    pub folder_type: FolderType,
}

/// What a folder holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolderType {
    /// Test cases.
    #[default]
    TestCase,
    /// Test plans.
    TestPlan,
    /// Test runs.
    TestRun,
}

impl FolderType {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TestCase => "TEST_CASE",
            Self::TestPlan => "TEST_PLAN",
            Self::TestRun => "TEST_RUN",
        }
    }
}

/// Arguments of `create_test_run`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestRunArgs {
    /// Project key.
    pub project_key: String,
    /// Run name.
    pub name: String,
    /// Test cases to include.
    #[serde(default)]
    pub test_case_keys: Option<Vec<String>>,
    /// Linked test plan.
    #[serde(default)]
    pub test_plan_key: Option<String>,
    /// Folder path.
    #[serde(default)]
    pub folder: Option<String>,
    /// ISO-8601 planned start.
    #[serde(default)]
    pub planned_start_date: Option<String>,
    /// ISO-8601 planned end.
    #[serde(default)]
    pub planned_end_date: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Owner.
    #[serde(default)]
    pub owner: Option<String>,
    /// Environment name.
    #[serde(default)]
    pub environment: Option<String>,
    /// Custom fields, passed through.
    #[serde(default)]
    pub custom_fields: Option<Map<String, Value>>,
}

/// Arguments of `search_test_cases_by_folder`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchTestCasesArgs {
    /// Project key.
    pub project_key: String,
    /// Folder path.
    pub folder_path: String,
    /// Page size.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

const fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

/// Arguments of `add_test_cases_to_run`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddTestCasesToRunArgs {
    /// Target run.
    pub test_run_key: String,
    /// Test cases to add.
    pub test_case_keys: Vec<String>,
}

/// Arguments of `get_test_execution`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestExecutionArgs {
    /// Execution id, as a string or number.
    pub execution_id: Value,
    /// Runs to search.
    #[serde(default)]
    pub test_run_keys: Option<Vec<String>>,
}

impl TestExecutionArgs {
    /// Returns the execution id as a string.
    #[must_use]
    pub fn execution_id(&self) -> String {
        id_string(&self.execution_id)
    }
}

/// Renders a JSON id (string or number) as a plain string.
#[must_use]
pub fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn insert_text(payload: &mut Map<String, Value>, field: &str, value: Option<&String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        payload.insert(field.to_string(), Value::String(v.clone()));
    }
}

fn insert_list(payload: &mut Map<String, Value>, field: &str, value: Option<&Vec<String>>) {
    if let Some(items) = value.filter(|items| !items.is_empty()) {
        payload.insert(field.to_string(), json!(items));
    }
}

/// Converts BDD text, keeping the raw text if nothing converts.
#[must_use]
pub fn bdd_script_text(bdd_content: &str) -> String {
    let gherkin = gherkin::convert(bdd_content);
    if gherkin.is_empty() {
        bdd_content.to_string()
    } else {
        gherkin
    }
}

/// Builds the `testScript` object.
#[must_use]
pub fn test_script_payload(script: &TestScriptArgs) -> Value {
    let mut payload = Map::new();
    payload.insert("type".to_string(), json!(script.script_type.as_str()));

    match script.script_type {
        ScriptType::StepByStep => {
            if let Some(ref steps) = script.steps {
                let steps: Vec<Value> = steps
                    .iter()
                    .map(|step| {
                        let mut obj = Map::new();
                        insert_text(&mut obj, "description", step.description.as_ref());
                        insert_text(&mut obj, "testData", step.test_data.as_ref());
                        insert_text(&mut obj, "expectedResult", step.expected_result.as_ref());
                        insert_text(&mut obj, "testCaseKey", step.test_case_key.as_ref());
                        Value::Object(obj)
                    })
                    .collect();
                payload.insert("steps".to_string(), Value::Array(steps));
            }
        }
        ScriptType::PlainText => {
            insert_text(&mut payload, "text", script.text.as_ref());
        }
        ScriptType::Bdd => {
            if let Some(text) = script.text.as_deref().filter(|t| !t.is_empty()) {
                payload.insert("text".to_string(), json!(bdd_script_text(text)));
            }
        }
    }

    Value::Object(payload)
}

/// Builds the body of a test case create request.
#[must_use]
pub fn test_case_payload(args: &TestCaseArgs) -> Value {
    let mut payload = Map::new();
    payload.insert("projectKey".to_string(), json!(args.project_key));
    payload.insert("name".to_string(), json!(args.name));

    insert_text(&mut payload, "folder", args.folder.as_ref());
    insert_text(&mut payload, "status", args.status.as_ref());
    insert_text(&mut payload, "priority", args.priority.as_ref());
    insert_text(&mut payload, "precondition", args.precondition.as_ref());
    insert_text(&mut payload, "objective", args.objective.as_ref());
    insert_text(&mut payload, "component", args.component.as_ref());
    insert_text(&mut payload, "owner", args.owner.as_ref());
    if let Some(estimated) = args.estimated_time.filter(|t| *t > 0) {
        payload.insert("estimatedTime".to_string(), json!(estimated));
    }
    insert_list(&mut payload, "labels", args.labels.as_ref());
    insert_list(&mut payload, "issueLinks", args.issue_links.as_ref());
    if let Some(ref custom) = args.custom_fields {
        payload.insert("customFields".to_string(), Value::Object(custom.clone()));
    }
    if let Some(ref parameters) = args.parameters {
        payload.insert("parameters".to_string(), parameters.clone());
    }
    if let Some(ref script) = args.test_script {
        payload.insert("testScript".to_string(), test_script_payload(script));
    }

    Value::Object(payload)
}

/// Builds the body of a BDD test case create request.
#[must_use]
pub fn bdd_test_case_payload(args: &BddTestCaseArgs) -> Value {
    let mut payload = Map::new();
    payload.insert("projectKey".to_string(), json!(args.project_key));
    payload.insert("name".to_string(), json!(args.name));
    insert_text(&mut payload, "folder", args.folder.as_ref());
    insert_text(&mut payload, "priority", args.priority.as_ref());
    payload.insert(
        "testScript".to_string(),
        json!({
            "type": ScriptType::Bdd.as_str(),
            "text": bdd_script_text(&args.bdd_content),
        }),
    );
    Value::Object(payload)
}

/// Builds the body replacing a test case's script with converted BDD.
///
/// Unlike creation there is no raw-text fallback: the converted text is
/// sent even when empty.
#[must_use]
pub fn bdd_update_payload(bdd_content: &str) -> Value {
    json!({
        "testScript": {
            "type": ScriptType::Bdd.as_str(),
            "text": gherkin::convert(bdd_content),
        }
    })
}

/// Resolves the absolute folder path sent to the backend.
///
/// A name starting with `/` is already absolute. Otherwise it is placed
/// under the parent (made absolute if needed), or under the root.
#[must_use]
pub fn folder_path(name: &str, parent_folder_path: Option<&str>) -> String {
    if name.starts_with('/') {
        return name.to_string();
    }

    match parent_folder_path.filter(|p| !p.is_empty()) {
        Some(parent) if parent.starts_with('/') => format!("{parent}/{name}"),
        Some(parent) => format!("/{parent}/{name}"),
        None => format!("/{name}"),
    }
}

/// Builds the body of a folder create request.
#[must_use]
pub fn folder_payload(args: &FolderArgs) -> Value {
    json!({
        "projectKey": args.project_key,
        "name": folder_path(&args.name, args.parent_folder_path.as_deref()),
        "type": args.folder_type.as_str(),
    })
}

/// Wraps test case keys as run items.
#[must_use]
pub fn run_items(test_case_keys: &[String]) -> Vec<Value> {
    test_case_keys
        .iter()
        .map(|key| json!({ "testCaseKey": key }))
        .collect()
}

/// Builds the body of a test run create request.
#[must_use]
pub fn test_run_payload(args: &TestRunArgs) -> Value {
    let mut payload = Map::new();
    payload.insert("projectKey".to_string(), json!(args.project_key));
    payload.insert("name".to_string(), json!(args.name));

    if let Some(keys) = args.test_case_keys.as_ref().filter(|k| !k.is_empty()) {
        payload.insert("items".to_string(), Value::Array(run_items(keys)));
    }
    insert_text(&mut payload, "folder", args.folder.as_ref());
    insert_text(&mut payload, "plannedStartDate", args.planned_start_date.as_ref());
    insert_text(&mut payload, "plannedEndDate", args.planned_end_date.as_ref());
    insert_text(&mut payload, "description", args.description.as_ref());
    insert_text(&mut payload, "owner", args.owner.as_ref());
    insert_text(&mut payload, "environment", args.environment.as_ref());
    if let Some(ref custom) = args.custom_fields {
        payload.insert("customFields".to_string(), Value::Object(custom.clone()));
    }
    insert_text(&mut payload, "testPlanKey", args.test_plan_key.as_ref());

    Value::Object(payload)
}

/// Escapes `\` and `"` for use inside a double-quoted query literal.
fn quote_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Builds the search query for test cases in a folder.
#[must_use]
pub fn folder_search_query(project_key: &str, folder_path: &str) -> String {
    format!(
        "projectKey = \"{}\" AND folder = \"{}\"",
        quote_literal(project_key),
        quote_literal(folder_path)
    )
}

/// Extracts `field` from each element of `items`, `null` where absent.
#[must_use]
pub fn pluck(items: &[Value], field: &str) -> Vec<Value> {
    items
        .iter()
        .map(|item| item.get(field).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Extracts test case keys from a search response.
///
/// Accepts a bare array or a paged `{ "values": [...] }` object.
#[must_use]
pub fn search_result_keys(body: &Value) -> Vec<Value> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => obj
            .get("values")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    };
    pluck(items, "key")
}

/// Result of merging new test cases into a run's items.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedItems {
    /// Existing items followed by the new ones.
    pub items: Vec<Value>,
    /// Number of items actually added.
    pub added: usize,
}

/// Appends run items for keys not already present.
///
/// Existing items are kept as-is and in order. Keys repeated in the
/// request are only added once.
#[must_use]
pub fn merge_run_items(existing: &[Value], test_case_keys: &[String]) -> MergedItems {
    let mut seen: Vec<&str> = existing
        .iter()
        .filter_map(|item| item.get("testCaseKey").and_then(Value::as_str))
        .collect();

    let mut items = existing.to_vec();
    let mut added = 0;
    for key in test_case_keys {
        if seen.contains(&key.as_str()) {
            continue;
        }
        seen.push(key);
        items.push(json!({ "testCaseKey": key }));
        added += 1;
    }

    MergedItems { items, added }
}

/// Builds the smallest test run update carrying new items.
#[must_use]
pub fn minimal_run_update_payload(current: &Value, items: &[Value]) -> Value {
    json!({
        "name": current.get("name").cloned().unwrap_or(Value::Null),
        "projectKey": current.get("projectKey").cloned().unwrap_or(Value::Null),
        "items": items,
    })
}

/// Copies a test run with its items replaced and read-only fields removed.
#[must_use]
pub fn full_run_update_payload(current: &Value, items: &[Value]) -> Value {
    let mut payload = current.as_object().cloned().unwrap_or_default();
    for field in READ_ONLY_RUN_FIELDS {
        payload.remove(field);
    }
    payload.insert("items".to_string(), Value::Array(items.to_vec()));
    Value::Object(payload)
}
