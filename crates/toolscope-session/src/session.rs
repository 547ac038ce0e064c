// crates/toolscope-session/src/session.rs
// ============================================================================
// Module: Tool Session
// Description: Per-tool editing state and the session manager.
// Purpose: Own form/JSON mode, submission, and tool list synchronization.
// Dependencies: serde_json, thiserror, time, toolscope-core
// ============================================================================

//! ## Overview
//! A [`ToolSession`] owns everything one tool needs between discoveries: the
//! synthesized field tree, the JSON text, the active view mode, and the last
//! execution outcome. Mode switches convert state in one direction at a time:
//! leaving form mode serializes the tree into the JSON text, entering form
//! mode populates the tree from it. [`SessionManager`] keeps one session per
//! advertised tool and rebuilds every session whenever the list changes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use toolscope_core::FormTree;
use toolscope_core::ValidationError;
use toolscope_core::build_form;
use toolscope_core::collect;
use toolscope_core::generate_template;
use toolscope_core::normalize_input_schema;
use toolscope_core::parse_input_schema;
use toolscope_core::populate;

use crate::audit::AuditSink;
use crate::audit::ExecutionAuditEvent;
use crate::audit::ExecutionOrigin;
use crate::host::HostError;
use crate::host::ToolDescriptor;
use crate::host::ToolHost;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Which editing surface of a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Structured field tree.
    Form,
    /// Raw JSON text.
    Json,
}

/// Result of one tool execution, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Whether the host reported success.
    pub success: bool,
    /// Pretty-printed output, or the error message.
    pub output: String,
}

/// Submission refused before reaching the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Required fields are blank; the host was not called.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Pretty-prints text that parses as JSON, otherwise returns it verbatim.
#[must_use]
pub fn format_as_json(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| raw.to_string())
}

// ============================================================================
// SECTION: Tool Session
// ============================================================================

/// Editing and execution state for one advertised tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSession {
    /// Descriptor the session was built from.
    descriptor: ToolDescriptor,
    /// Active editing surface.
    mode: ViewMode,
    /// Synthesized field tree.
    form: FormTree,
    /// JSON text, seeded with a generated template.
    json_text: String,
    /// Outcome of the most recent submission.
    last_outcome: Option<ExecutionOutcome>,
}

impl ToolSession {
    /// Builds a session from a descriptor.
    ///
    /// A template generated at `now` seeds both surfaces: the JSON text holds
    /// its pretty rendering and the form is populated from it, so a fresh
    /// session submits the template values in either mode.
    #[must_use]
    pub fn new(descriptor: ToolDescriptor, now: OffsetDateTime) -> Self {
        let schema = normalize_input_schema(&parse_input_schema(descriptor.input_schema.as_ref()));
        let template = generate_template(&schema, now);
        let json_text = serde_json::to_string_pretty(&template)
            .unwrap_or_else(|_| template.to_string());
        let mut form = build_form(&schema);
        populate(&json_text, &mut form);
        Self { descriptor, mode: ViewMode::Form, form, json_text, last_outcome: None }
    }

    /// Returns the descriptor the session was built from.
    #[must_use]
    pub const fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Returns the active editing surface.
    #[must_use]
    pub const fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Returns the field tree.
    #[must_use]
    pub const fn form(&self) -> &FormTree {
        &self.form
    }

    /// Returns the field tree mutably for direct edits in form mode.
    pub fn form_mut(&mut self) -> &mut FormTree {
        &mut self.form
    }

    /// Returns the JSON text.
    #[must_use]
    pub fn json_text(&self) -> &str {
        &self.json_text
    }

    /// Replaces the JSON text, as typing in JSON mode would.
    pub fn set_json_text(&mut self, text: String) {
        self.json_text = text;
    }

    /// Returns the outcome of the most recent submission.
    #[must_use]
    pub const fn last_outcome(&self) -> Option<&ExecutionOutcome> {
        self.last_outcome.as_ref()
    }

    /// Returns whether the tool declares any input parameters.
    #[must_use]
    pub fn has_input_parameters(&self) -> bool {
        !self.form.is_empty()
    }

    /// Switches the editing surface, converting state across.
    ///
    /// Leaving form mode serializes the tree into the JSON text first;
    /// entering form mode then populates the tree from the JSON text, where
    /// unparseable text leaves the tree as it was.
    pub fn set_mode(&mut self, mode: ViewMode) {
        if mode == self.mode {
            return;
        }
        if self.mode == ViewMode::Form {
            self.json_text = render_collected(&self.form);
        }
        self.mode = mode;
        if self.mode == ViewMode::Form {
            populate(&self.json_text.clone(), &mut self.form);
        }
    }

    /// Discards all edits and rebuilds the session from its descriptor.
    pub fn reset(&mut self, now: OffsetDateTime) {
        *self = Self::new(self.descriptor.clone(), now);
    }

    /// Submits the current arguments to the host.
    ///
    /// Form mode validates first and refuses to call the host when required
    /// fields are blank. Host failures are not errors of this method; they
    /// come back as an unsuccessful [`ExecutionOutcome`] and are recorded
    /// like successes.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Validation`] when form-mode validation fails.
    pub async fn submit(
        &mut self,
        host: &dyn ToolHost,
        audit: &dyn AuditSink,
    ) -> Result<ExecutionOutcome, SubmitError> {
        let args = match self.mode {
            ViewMode::Form => {
                self.form.validate()?;
                Value::Object(collect(&self.form)).to_string()
            }
            ViewMode::Json => self.json_text.clone(),
        };
        let outcome = match host.execute_tool(&self.descriptor.name, &args).await {
            Ok(raw) => {
                audit.record(&ExecutionAuditEvent::new(
                    &self.descriptor.name,
                    ExecutionOrigin::Session,
                    true,
                    &args,
                    &raw,
                ));
                ExecutionOutcome { success: true, output: format_as_json(&raw) }
            }
            Err(error) => {
                let message = error.to_string();
                audit.record(&ExecutionAuditEvent::new(
                    &self.descriptor.name,
                    ExecutionOrigin::Session,
                    false,
                    &args,
                    &message,
                ));
                ExecutionOutcome { success: false, output: format!("Error: {message}") }
            }
        };
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }
}

/// Serializes the tree's collected arguments as pretty JSON.
fn render_collected(form: &FormTree) -> String {
    let collected = Value::Object(collect(form));
    serde_json::to_string_pretty(&collected).unwrap_or_else(|_| collected.to_string())
}

// ============================================================================
// SECTION: Session Manager
// ============================================================================

/// One session per advertised tool, kept in sync with the host's tool list.
#[derive(Debug, Default)]
pub struct SessionManager {
    /// Sessions keyed by tool name.
    sessions: BTreeMap<String, ToolSession>,
    /// Descriptor list from the last synchronization.
    descriptors: Vec<ToolDescriptor>,
}

impl SessionManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the descriptors from the last synchronization.
    #[must_use]
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Returns the session for a tool name, when present.
    #[must_use]
    pub fn session(&self, name: &str) -> Option<&ToolSession> {
        self.sessions.get(name)
    }

    /// Returns the session for a tool name mutably, when present.
    pub fn session_mut(&mut self, name: &str) -> Option<&mut ToolSession> {
        self.sessions.get_mut(name)
    }

    /// Replaces the tool list and returns whether it changed.
    ///
    /// Any change discards every session and rebuilds one per advertised
    /// tool; no editing state is carried across a list change. An unchanged
    /// list is a no-op.
    pub fn sync_tools(&mut self, tools: Vec<ToolDescriptor>, now: OffsetDateTime) -> bool {
        if tools == self.descriptors {
            return false;
        }
        self.sessions = tools
            .iter()
            .map(|tool| (tool.name.clone(), ToolSession::new(tool.clone(), now)))
            .collect();
        self.descriptors = tools;
        true
    }

    /// Fetches the tool list from the host and synchronizes sessions.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when the host cannot be listed; sessions are
    /// left untouched in that case.
    pub async fn refresh(
        &mut self,
        host: &dyn ToolHost,
        now: OffsetDateTime,
    ) -> Result<bool, HostError> {
        let tools = host.list_tools().await?;
        Ok(self.sync_tools(tools, now))
    }
}

#[cfg(test)]
mod tests;
