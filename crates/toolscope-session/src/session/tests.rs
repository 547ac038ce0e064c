// crates/toolscope-session/src/session/tests.rs
// ============================================================================
// Module: Tool Session Unit Tests
// Description: Validates mode switching, submission, and tool list sync.
// Purpose: Pin the session state machine against a stub host.
// Dependencies: serde_json, time, tokio, toolscope-core
// ============================================================================

//! ## Overview
//! Drives sessions against an in-memory host, covering the form/JSON mode
//! ordering, fail-closed validation, error outcomes, and manager sync.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions use panic-based helpers for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use time::macros::datetime;
use toolscope_core::FieldControl;
use toolscope_core::collect;

use super::ExecutionOutcome;
use super::SessionManager;
use super::SubmitError;
use super::ToolSession;
use super::ViewMode;
use super::format_as_json;
use crate::audit::NoopAuditSink;
use crate::host::HostError;
use crate::host::ToolDescriptor;
use crate::host::ToolHost;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const NOW: OffsetDateTime = datetime!(2024-03-09 16:40:00.123 UTC);

/// Host that records executions and replies from a script.
struct StubHost {
    tools: Vec<ToolDescriptor>,
    executed: Mutex<Vec<(String, String)>>,
    reply: Result<String, HostError>,
}

impl StubHost {
    fn new(tools: Vec<ToolDescriptor>, reply: Result<String, HostError>) -> Self {
        Self { tools, executed: Mutex::new(Vec::new()), reply }
    }

    fn executions(&self) -> Vec<(String, String)> {
        self.executed.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ToolHost for StubHost {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, HostError> {
        Ok(self.tools.clone())
    }

    async fn execute_tool(&self, name: &str, args_json: &str) -> Result<String, HostError> {
        self.executed.lock().expect("lock").push((name.to_string(), args_json.to_string()));
        self.reply.clone()
    }
}

fn weather_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "get_weather".to_string(),
        description: Some("Weather lookup".to_string()),
        input_schema: Some(json!({
            "properties": {
                "city": {"type": "string"},
                "days": {"type": "integer", "default": 1}
            },
            "required": ["city"]
        })),
    }
}

fn set_text_field(session: &mut ToolSession, name: &str, value: &str) {
    if let Some(field) = session.form_mut().field_mut(name)
        && let FieldControl::Text(text) = &mut field.control
    {
        text.value = value.to_string();
    }
}

// ============================================================================
// SECTION: Session State Tests
// ============================================================================

#[test]
fn new_session_seeds_json_text_with_a_template() {
    let session = ToolSession::new(weather_descriptor(), NOW);
    assert_eq!(session.mode(), ViewMode::Form);
    assert!(session.has_input_parameters());
    let template: Value = serde_json::from_str(session.json_text()).expect("template json");
    assert_eq!(template, json!({"city": "example_string", "days": 1}));
}

#[test]
fn fresh_form_collects_the_template_values() {
    let descriptor = ToolDescriptor {
        name: "convert".to_string(),
        description: None,
        input_schema: Some(json!({
            "properties": {
                "city": {"type": "string"},
                "unit": {"type": "string", "enum": ["c", "f"]}
            }
        })),
    };
    let session = ToolSession::new(descriptor, NOW);
    let collected = Value::Object(collect(session.form()));
    let template: Value = serde_json::from_str(session.json_text()).expect("template json");
    assert_eq!(collected, template);
    assert_eq!(collected, json!({"city": "example_string", "unit": "c"}));
}

#[test]
fn string_encoded_schema_is_accepted() {
    let descriptor = ToolDescriptor {
        name: "t".to_string(),
        description: None,
        input_schema: Some(json!("{\"properties\": {\"a\": {\"type\": \"string\"}}}")),
    };
    let session = ToolSession::new(descriptor, NOW);
    assert!(session.has_input_parameters());
}

#[test]
fn schemaless_tool_has_no_parameters() {
    let descriptor =
        ToolDescriptor { name: "ping".to_string(), description: None, input_schema: None };
    let session = ToolSession::new(descriptor, NOW);
    assert!(!session.has_input_parameters());
    assert_eq!(session.json_text(), "{}");
}

#[test]
fn leaving_form_mode_serializes_and_entering_populates() {
    let mut session = ToolSession::new(weather_descriptor(), NOW);
    set_text_field(&mut session, "city", "Oslo");

    session.set_mode(ViewMode::Json);
    let serialized: Value = serde_json::from_str(session.json_text()).expect("collected json");
    assert_eq!(serialized, json!({"city": "Oslo", "days": 1}));

    session.set_json_text(r#"{"city": "Bergen", "days": 3}"#.to_string());
    session.set_mode(ViewMode::Form);
    session.set_mode(ViewMode::Json);
    let round: Value = serde_json::from_str(session.json_text()).expect("round json");
    assert_eq!(round, json!({"city": "Bergen", "days": 3}));
}

#[test]
fn entering_form_mode_with_bad_json_keeps_the_form() {
    let mut session = ToolSession::new(weather_descriptor(), NOW);
    set_text_field(&mut session, "city", "Oslo");
    session.set_mode(ViewMode::Json);
    session.set_json_text("{ broken".to_string());
    session.set_mode(ViewMode::Form);
    session.set_mode(ViewMode::Json);
    let kept: Value = serde_json::from_str(session.json_text()).expect("kept json");
    assert_eq!(kept, json!({"city": "Oslo", "days": 1}));
}

#[test]
fn setting_the_same_mode_is_a_no_op() {
    let mut session = ToolSession::new(weather_descriptor(), NOW);
    session.set_json_text("custom".to_string());
    session.set_mode(ViewMode::Form);
    assert_eq!(session.json_text(), "custom");
}

#[test]
fn reset_discards_edits() {
    let mut session = ToolSession::new(weather_descriptor(), NOW);
    set_text_field(&mut session, "city", "Oslo");
    session.set_json_text("edited".to_string());
    session.reset(NOW);
    let template: Value = serde_json::from_str(session.json_text()).expect("template json");
    assert_eq!(template, json!({"city": "example_string", "days": 1}));
    assert_eq!(session.mode(), ViewMode::Form);
}

// ============================================================================
// SECTION: Submission Tests
// ============================================================================

#[tokio::test]
async fn form_submission_validates_before_calling_the_host() {
    let host = StubHost::new(Vec::new(), Ok("ok".to_string()));
    let mut session = ToolSession::new(weather_descriptor(), NOW);
    set_text_field(&mut session, "city", "");
    let error = session.submit(&host, &NoopAuditSink).await.expect_err("blank required field");
    let SubmitError::Validation(validation) = error;
    assert_eq!(validation.fields, vec!["city"]);
    assert!(host.executions().is_empty(), "host must not be called");
}

#[tokio::test]
async fn form_submission_sends_collected_arguments() {
    let host = StubHost::new(Vec::new(), Ok(r#"{"temp": 7}"#.to_string()));
    let mut session = ToolSession::new(weather_descriptor(), NOW);
    set_text_field(&mut session, "city", "Oslo");
    let outcome = session.submit(&host, &NoopAuditSink).await.expect("submit");
    assert!(outcome.success);
    assert_eq!(outcome.output, "{\n  \"temp\": 7\n}");
    let executions = host.executions();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].0, "get_weather");
    let sent: Value = serde_json::from_str(&executions[0].1).expect("args json");
    assert_eq!(sent, json!({"city": "Oslo", "days": 1}));
    assert_eq!(session.last_outcome(), Some(&outcome));
}

#[tokio::test]
async fn json_submission_sends_the_raw_text() {
    let host = StubHost::new(Vec::new(), Ok("plain output".to_string()));
    let mut session = ToolSession::new(weather_descriptor(), NOW);
    session.set_mode(ViewMode::Json);
    session.set_json_text("{ not even json".to_string());
    let outcome = session.submit(&host, &NoopAuditSink).await.expect("submit");
    assert!(outcome.success);
    assert_eq!(outcome.output, "plain output");
    assert_eq!(host.executions()[0].1, "{ not even json");
}

#[tokio::test]
async fn host_failures_become_error_outcomes() {
    let host = StubHost::new(Vec::new(), Err(HostError::Execution("boom".to_string())));
    let mut session = ToolSession::new(weather_descriptor(), NOW);
    set_text_field(&mut session, "city", "Oslo");
    let outcome = session.submit(&host, &NoopAuditSink).await.expect("submit");
    assert!(!outcome.success);
    assert_eq!(outcome.output, "Error: tool execution failed: boom");
}

#[test]
fn format_as_json_pretty_prints_or_passes_through() {
    assert_eq!(format_as_json(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    assert_eq!(format_as_json("not json"), "not json");
}

// ============================================================================
// SECTION: Manager Tests
// ============================================================================

#[tokio::test]
async fn refresh_reports_changes_and_an_unchanged_list_is_a_no_op() {
    let weather = weather_descriptor();
    let host = StubHost::new(vec![weather], Ok("ok".to_string()));
    let mut manager = SessionManager::new();

    assert!(manager.refresh(&host, NOW).await.expect("refresh"));
    if let Some(session) = manager.session_mut("get_weather") {
        set_text_field(session, "city", "Oslo");
    }

    assert!(!manager.refresh(&host, NOW).await.expect("refresh"), "unchanged list");
    let session = manager.session("get_weather").expect("kept session");
    if let Some(field) = session.form().field("city")
        && let FieldControl::Text(text) = &field.control
    {
        assert_eq!(text.value, "Oslo", "unchanged list keeps every session");
    }
}

#[tokio::test]
async fn any_list_change_rebuilds_every_session() {
    let weather = weather_descriptor();
    let host = StubHost::new(vec![weather.clone()], Ok("ok".to_string()));
    let mut manager = SessionManager::new();
    manager.refresh(&host, NOW).await.expect("refresh");
    if let Some(session) = manager.session_mut("get_weather") {
        set_text_field(session, "city", "Oslo");
    }

    let ping = ToolDescriptor { name: "ping".to_string(), description: None, input_schema: None };
    let host = StubHost::new(vec![weather, ping], Ok("ok".to_string()));
    assert!(manager.refresh(&host, NOW).await.expect("refresh"), "new tool added");
    assert_eq!(manager.descriptors().len(), 2);

    let session = manager.session("get_weather").expect("rebuilt session");
    if let Some(field) = session.form().field("city")
        && let FieldControl::Text(text) = &field.control
    {
        assert_eq!(text.value, "example_string", "no state crosses a list change");
    }
    let _outcome: Option<&ExecutionOutcome> = session.last_outcome();
}

#[tokio::test]
async fn changed_descriptor_rebuilds_the_session() {
    let mut manager = SessionManager::new();
    let host = StubHost::new(vec![weather_descriptor()], Ok("ok".to_string()));
    manager.refresh(&host, NOW).await.expect("refresh");
    if let Some(session) = manager.session_mut("get_weather") {
        set_text_field(session, "city", "Oslo");
    }

    let mut changed = weather_descriptor();
    changed.description = Some("Updated".to_string());
    let host = StubHost::new(vec![changed], Ok("ok".to_string()));
    assert!(manager.refresh(&host, NOW).await.expect("refresh"));

    let session = manager.session("get_weather").expect("rebuilt session");
    if let Some(field) = session.form().field("city")
        && let FieldControl::Text(text) = &field.control
    {
        assert_eq!(text.value, "example_string", "changed descriptor gets a fresh session");
    }
}
