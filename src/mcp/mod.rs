//! Model Context Protocol (MCP) server.
//!
//! Exposes Zephyr Scale operations as MCP tools and resources over a
//! newline-delimited JSON-RPC 2.0 stdio transport.
//!
//! ```text
//! ┌───────────┐    ┌───────────┐    ┌─────────────────────┐    ┌───────────┐
//! │ Transport │───▶│  Server   │───▶│ Tools / Resources   │───▶│ ZephyrApi │
//! │  (stdio)  │    │(lifecycle)│    │ (payload mapping)   │    │  (HTTP)   │
//! └───────────┘    └───────────┘    └─────────────────────┘    └───────────┘
//! ```
//!
//! Targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};
