//! zephyr-scale-mcp: MCP server for Zephyr Scale test management
//!
//! Exposes test case, test run and folder operations of Zephyr Scale as MCP
//! tools, translating each call into a REST request against either Zephyr
//! Scale Cloud or the Zephyr Scale plugin on Jira Data Center.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`backend`]: Cloud / Data Center detection and endpoint resolution
//! - [`gherkin`]: Markdown BDD to Gherkin conversion
//! - [`zephyr`]: REST dispatch and payload mapping
//! - [`mcp`]: MCP protocol, tools and resources
//! - [`error`]: Error types

pub mod backend;
pub mod config;
pub mod error;
pub mod gherkin;
pub mod mcp;
pub mod zephyr;
