//! MCP server lifecycle and request routing.
//!
//! 1. **Initialisation**: `initialize` then `notifications/initialized`
//! 2. **Operation**: tools, resources and ping
//! 3. **Shutdown**: end of input or SIGINT/SIGTERM
//!
//! Requests are handled one at a time in arrival order.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, Stdin, Stdout};

use crate::backend::BackendProfile;
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::resources::{ResourceHandlers, ResourceReadParams};
use crate::mcp::tools::{ToolCallParams, ToolHandlers};
use crate::mcp::transport::{StdioTransport, Transport};
use crate::zephyr::ZephyrApi;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ListCapabilities>,
    /// Resource-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ListCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ListCapabilities::default()),
            resources: Some(ListCapabilities::default()),
        }
    }
}

/// Capabilities of a listable feature (tools, resources).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCapabilities {
    /// Whether the list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes &T
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// The Zephyr Scale MCP server.
pub struct McpServer<R = BufReader<Stdin>, W = Stdout> {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: Transport<R, W>,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    tools: ToolHandlers,
    resources: ResourceHandlers,
}

impl McpServer {
    /// Creates a server speaking over stdin/stdout.
    ///
    /// `allowed_paths` limits which local files `file://` resources may
    /// read; an empty list means the current working directory.
    #[must_use]
    pub fn new(
        profile: Arc<BackendProfile>,
        api: Arc<dyn ZephyrApi>,
        allowed_paths: Vec<PathBuf>,
    ) -> Self {
        Self::with_transport(StdioTransport::stdio(), profile, api, allowed_paths)
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server over an arbitrary transport.
    #[must_use]
    pub fn with_transport(
        transport: Transport<R, W>,
        profile: Arc<BackendProfile>,
        api: Arc<dyn ZephyrApi>,
        allowed_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport,
            protocol_version: None,
            tools: ToolHandlers::new(Arc::clone(&profile), Arc::clone(&api)),
            resources: ResourceHandlers::new(profile, api, allowed_paths),
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the server until input ends or a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Serves messages until input ends, without signal handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> io::Result<()> {
        loop {
            let line_result = self.transport.read_line().await;
            if self.handle_transport_result(line_result).await? {
                return Ok(());
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: io::Result<Option<String>>,
    ) -> io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("Input closed, shutting down");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        match parse_message(&line) {
            Ok(IncomingMessage::Request(req)) => self.handle_request(req).await?,
            Ok(IncomingMessage::Notification(ref notif)) => self.handle_notification(notif),
            Err(error) => {
                tracing::debug!(code = error.error.code, "Rejected malformed message");
                self.transport.write_error(&error).await?;
            }
        }

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles an incoming request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> io::Result<()> {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req).await,
            "resources/list" => self.handle_resources_list(&req),
            "resources/read" => self.handle_resources_read(&req).await,
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => self.transport.write_response(&resp).await,
            Err(error) => self.transport.write_error(&error).await,
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            tracing::info!("Client initialised, server running");
            self.state = ServerState::Running;
        } else {
            tracing::trace!(method = %notif.method, "Ignoring notification");
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::rejected(
                req.id.clone(),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req.parse_params("initialize")?;

        if let Some(ref client) = params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                protocol_version = %params.protocol_version,
                "Client connected"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();
        if params.protocol_version != negotiated_version {
            tracing::debug!(
                requested = %params.protocol_version,
                offered = %negotiated_version,
                "Client requested a different protocol version"
            );
        }

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": ToolHandlers::definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = req.parse_params("tool call")?;

        let result = self
            .tools
            .call(&params.name, &params.arguments)
            .await
            .map_err(|e| e.into_rpc_error(req.id.clone()))?;

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Handles the resources/list request.
    fn handle_resources_list(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "resources": ResourceHandlers::definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the resources/read request.
    async fn handle_resources_read(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ResourceReadParams = req.parse_params("resource read")?;

        let contents = self
            .resources
            .read(&params.uri)
            .await
            .map_err(|e| e.into_rpc_error(req.id.clone()))?;

        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "contents": contents }),
        ))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::rejected(id.clone(), "Server not initialised"));
        }
        Ok(())
    }

    /// Consumes the server, returning the transport's writer.
    pub fn into_writer(self) -> W {
        self.transport.into_writer()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::backend::build_profile;
    use crate::config::ZephyrConfig;
    use crate::mcp::protocol::ErrorCode;
    use crate::zephyr::{ApiResponse, MockZephyrApi};

    type TestServer = McpServer<Cursor<Vec<u8>>, Vec<u8>>;

    const INITIALIZE: &str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test-client","version":"1.0.0"}}}"#;
    const INITIALIZED: &str = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;

    fn server(lines: &[&str], mock: MockZephyrApi) -> TestServer {
        let mut input = lines.join("\n");
        input.push('\n');
        let profile = Arc::new(
            build_profile(&ZephyrConfig {
                base_url: Some("https://jira.acme.com".to_string()),
                api_key: Some("token".to_string()),
                ..ZephyrConfig::default()
            })
            .unwrap(),
        );
        McpServer::with_transport(
            Transport::new(Cursor::new(input.into_bytes()), Vec::new()),
            profile,
            Arc::new(mock),
            Vec::new(),
        )
    }

    async fn exchange(lines: &[&str], mock: MockZephyrApi) -> (ServerState, Vec<Value>) {
        let mut server = server(lines, mock);
        server.serve().await.unwrap();
        let state = server.state();
        let output = String::from_utf8(server.into_writer()).unwrap();
        let messages = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (state, messages)
    }

    #[test]
    fn server_initial_state() {
        let server = server(&[], MockZephyrApi::new());
        assert_eq!(server.state(), ServerState::AwaitingInit);
        assert!(server.protocol_version().is_none());
    }

    #[test]
    fn capabilities_advertise_tools_and_resources() {
        let caps = serde_json::to_value(ServerCapabilities::default()).unwrap();
        assert_eq!(caps, json!({"tools": {}, "resources": {}}));
    }

    #[tokio::test]
    async fn initialise_handshake_and_listing() {
        let (state, messages) = exchange(
            &[
                INITIALIZE,
                INITIALIZED,
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
                r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#,
                r#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#,
            ],
            MockZephyrApi::new(),
        )
        .await;

        assert_eq!(state, ServerState::ShuttingDown);
        assert_eq!(messages.len(), 4);

        assert_eq!(messages[0]["id"], 1);
        assert_eq!(messages[0]["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(messages[0]["result"]["serverInfo"]["name"], "zephyr-scale-mcp");

        assert_eq!(messages[1]["result"]["tools"].as_array().unwrap().len(), 12);
        assert_eq!(messages[2]["result"]["resources"].as_array().unwrap().len(), 5);
        assert_eq!(messages[3], json!({"jsonrpc": "2.0", "id": 4, "result": {}}));
    }

    #[tokio::test]
    async fn requests_before_initialised_are_rejected() {
        let (_, messages) = exchange(
            &[
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
                INITIALIZE,
                r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#,
            ],
            MockZephyrApi::new(),
        )
        .await;

        assert_eq!(messages[0]["error"]["code"], ErrorCode::InvalidRequest.code());
        assert_eq!(messages[0]["error"]["message"], "Server not initialised");
        assert!(messages[1].get("result").is_some());
        assert_eq!(messages[2]["error"]["code"], ErrorCode::InvalidRequest.code());
    }

    #[tokio::test]
    async fn second_initialize_is_rejected() {
        let (_, messages) = exchange(&[INITIALIZE, INITIALIZED, INITIALIZE], MockZephyrApi::new()).await;
        assert_eq!(messages[1]["error"]["message"], "Server already initialised");
    }

    #[tokio::test]
    async fn malformed_and_unknown_messages() {
        let (_, messages) = exchange(
            &[
                "not json",
                "",
                INITIALIZE,
                INITIALIZED,
                r#"{"jsonrpc":"2.0","id":9,"method":"prompts/list"}"#,
            ],
            MockZephyrApi::new(),
        )
        .await;

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["error"]["code"], ErrorCode::ParseError.code());
        assert!(messages[0].get("id").is_none());
        assert_eq!(messages[2]["error"]["code"], ErrorCode::MethodNotFound.code());
    }

    #[tokio::test]
    async fn tool_call_round_trip() {
        let mut mock = MockZephyrApi::new();
        mock.expect_send()
            .withf(|req| req.path == "/rest/atm/1.0/testcase/PROJ-T1")
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!({"key": "PROJ-T1"}))));

        let (_, messages) = exchange(
            &[
                INITIALIZE,
                INITIALIZED,
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"get_test_case","arguments":{"test_case_key":"PROJ-T1"}}}"#,
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"no_such_tool","arguments":{}}}"#,
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"get_test_case","arguments":{}}}"#,
                r#"{"jsonrpc":"2.0","id":5,"method":"tools/call"}"#,
            ],
            mock,
        )
        .await;

        let content = &messages[1]["result"]["content"][0];
        assert_eq!(content["type"], "text");
        assert!(content["text"].as_str().unwrap().contains("PROJ-T1"));

        assert_eq!(messages[2]["error"]["code"], ErrorCode::MethodNotFound.code());
        assert_eq!(messages[3]["error"]["code"], ErrorCode::InvalidParams.code());
        assert_eq!(messages[4]["error"]["code"], ErrorCode::InvalidParams.code());
    }

    #[tokio::test]
    async fn resource_read_round_trip() {
        let (_, messages) = exchange(
            &[
                INITIALIZE,
                INITIALIZED,
                r#"{"jsonrpc":"2.0","id":2,"method":"resources/read","params":{"uri":"zephyr://examples/gherkin-conversion"}}"#,
                r#"{"jsonrpc":"2.0","id":3,"method":"resources/read","params":{"uri":"zephyr://nothing"}}"#,
            ],
            MockZephyrApi::new(),
        )
        .await;

        let contents = &messages[1]["result"]["contents"][0];
        assert_eq!(contents["uri"], "zephyr://examples/gherkin-conversion");
        assert_eq!(contents["mimeType"], "text/plain");

        assert_eq!(messages[2]["error"]["code"], ErrorCode::InvalidRequest.code());
    }
}
