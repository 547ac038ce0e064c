// crates/toolscope-session/src/audit.rs
// ============================================================================
// Module: Execution Audit
// Description: Audit event type and sinks for tool execution records.
// Purpose: Record every host execution as a structured JSON line.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every tool execution, whether driven by a session submit or the chat
//! loop, emits one [`ExecutionAuditEvent`] to an [`AuditSink`]. Sinks write
//! JSON lines; recording is best effort and never fails the execution path.
//! Payloads are summarized as byte counts, not logged verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

// ============================================================================
// SECTION: Event
// ============================================================================

/// What triggered a tool execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOrigin {
    /// Direct submission from a tool session.
    Session,
    /// A function call issued by the chat loop.
    Chat,
}

/// One recorded tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionAuditEvent<'a> {
    /// Event discriminator, always `tool_execution`.
    pub event: &'static str,
    /// Name of the executed tool.
    pub tool: &'a str,
    /// What triggered the execution.
    pub origin: ExecutionOrigin,
    /// `ok` or `error`.
    pub outcome: &'static str,
    /// Size of the argument document in bytes.
    pub request_bytes: usize,
    /// Size of the raw output or error message in bytes.
    pub response_bytes: usize,
}

impl<'a> ExecutionAuditEvent<'a> {
    /// Builds an execution event from the request and response texts.
    #[must_use]
    pub fn new(
        tool: &'a str,
        origin: ExecutionOrigin,
        succeeded: bool,
        request: &str,
        response: &str,
    ) -> Self {
        Self {
            event: "tool_execution",
            tool,
            origin,
            outcome: if succeeded { "ok" } else { "error" },
            request_bytes: request.len(),
            response_bytes: response.len(),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Records one event. Implementations swallow their own write failures.
    fn record(&self, event: &ExecutionAuditEvent<'_>);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &ExecutionAuditEvent<'_>) {}
}

/// Sink that writes JSON lines to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &ExecutionAuditEvent<'_>) {
        if let Ok(line) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        }
    }
}

/// Sink that appends JSON lines to a file.
#[derive(Debug)]
pub struct FileAuditSink {
    /// Open handle, serialized so concurrent records stay line-atomic.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit file for appending, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be opened.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &ExecutionAuditEvent<'_>) {
        let Ok(line) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    //! File sink behavior against a temporary directory.
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only assertions use panic-based helpers for clarity."
    )]

    use super::AuditSink;
    use super::ExecutionAuditEvent;
    use super::ExecutionOrigin;
    use super::FileAuditSink;

    #[test]
    fn file_sink_appends_one_json_line_per_event() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("audit.jsonl");
        let sink = FileAuditSink::open(&path).expect("open sink");
        sink.record(&ExecutionAuditEvent::new(
            "weather",
            ExecutionOrigin::Session,
            true,
            "{\"city\":\"Oslo\"}",
            "sunny",
        ));
        sink.record(&ExecutionAuditEvent::new(
            "weather",
            ExecutionOrigin::Chat,
            false,
            "{}",
            "boom",
        ));
        let contents = std::fs::read_to_string(&path).expect("read audit file");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["event"], "tool_execution");
        assert_eq!(first["origin"], "session");
        assert_eq!(first["outcome"], "ok");
        assert_eq!(first["request_bytes"], 15);
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("json line");
        assert_eq!(second["origin"], "chat");
        assert_eq!(second["outcome"], "error");
    }
}
