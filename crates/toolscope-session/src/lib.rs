// crates/toolscope-session/src/lib.rs
// ============================================================================
// Module: Tool Scope Session
// Description: Tool session controllers, chat loop, settings, and audit sinks.
// Purpose: Drive tool execution and the tool-calling chat over a host trait.
// Dependencies: async-trait, serde, serde_json, thiserror, time, toolscope-core
// ============================================================================

//! ## Overview
//! Sits between the schema engine and whatever hosts the tools. A
//! [`ToolHost`] implementation supplies tool discovery and execution; each
//! discovered tool gets a [`ToolSession`] holding per-tool editing state, and
//! a [`ChatSession`] runs the bounded tool-calling loop against a
//! [`ChatModel`]. Executions are recorded through an [`AuditSink`].
//!
//! ## Invariants
//! - All tool state is per-session; nothing is process-global.
//! - Form-mode submission is fail-closed: validation runs before any host
//!   call and a failure leaves the host untouched.
//! - The chat loop never surfaces an error as a failure; errors become trace
//!   records and events.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod chat;
pub mod host;
pub mod session;
pub mod settings;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::ExecutionAuditEvent;
pub use audit::ExecutionOrigin;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use chat::ChatConfig;
pub use chat::ChatError;
pub use chat::ChatEvent;
pub use chat::ChatMessage;
pub use chat::ChatModel;
pub use chat::ChatReply;
pub use chat::ChatSession;
pub use chat::FunctionCall;
pub use chat::FunctionDeclaration;
pub use chat::FunctionResponse;
pub use chat::TraceRecord;
pub use host::HostError;
pub use host::ToolDescriptor;
pub use host::ToolHost;
pub use session::ExecutionOutcome;
pub use session::SessionManager;
pub use session::SubmitError;
pub use session::ToolSession;
pub use session::ViewMode;
pub use settings::ChatSettings;
pub use settings::FileSettings;
pub use settings::MemorySettings;
pub use settings::SettingsError;
pub use settings::SettingsStore;
