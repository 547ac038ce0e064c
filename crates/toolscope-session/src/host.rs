// crates/toolscope-session/src/host.rs
// ============================================================================
// Module: Tool Host
// Description: Descriptor type and trait for tool discovery and execution.
// Purpose: Decouple sessions and chat from any concrete tool transport.
// Dependencies: async-trait, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`ToolHost`] is whatever actually owns the tools: a page bridge, a test
//! stub, a local registry. Sessions and the chat loop only ever see this
//! trait, so every execution path is testable without a live host.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Descriptor
// ============================================================================

/// One tool as advertised by a host.
///
/// The input schema arrives as raw JSON and may itself be a JSON-encoded
/// string; [`toolscope_core::parse_input_schema`] handles both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name used for execution.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw input schema value, when the tool declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure talking to or executing against a tool host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host cannot be reached at all.
    #[error("tool host unavailable: {0}")]
    Unavailable(String),
    /// The host does not know the requested tool.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// The tool ran and reported a failure.
    #[error("tool execution failed: {0}")]
    Execution(String),
}

// ============================================================================
// SECTION: Host Trait
// ============================================================================

/// Tool discovery and execution surface.
#[async_trait]
pub trait ToolHost: Send + Sync {
    /// Lists the tools currently advertised by the host.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when the host cannot be reached.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, HostError>;

    /// Executes a tool with a JSON argument document and returns its raw
    /// output text.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when the tool is unknown or the execution fails.
    async fn execute_tool(&self, name: &str, args_json: &str) -> Result<String, HostError>;
}
