// crates/toolscope-session/src/chat.rs
// ============================================================================
// Module: Chat Loop
// Description: Bounded tool-calling conversation over a chat model trait.
// Purpose: Turn one user prompt into model turns, tool executions, and events.
// Dependencies: async-trait, serde, serde_json, thiserror, time, toolscope-core
// ============================================================================

//! ## Overview
//! One prompt drives a loop: send the message, execute every function call
//! the model returns against the [`ToolHost`], feed the results back, repeat
//! until the model answers without calls or the iteration cap is hit. The
//! loop itself never fails; transport and tool errors become trace records
//! and [`ChatEvent`]s, and tool errors are reported back to the model so it
//! can recover.
//!
//! Every turn is appended to a serializable trace that can be exported for
//! debugging a conversation after the fact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;
use toolscope_core::parse_input_schema;

use crate::audit::AuditSink;
use crate::audit::ExecutionAuditEvent;
use crate::audit::ExecutionOrigin;
use crate::host::ToolDescriptor;
use crate::host::ToolHost;

/// Iteration cap for one prompt's tool-calling loop.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// One function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    /// Tool to execute.
    pub name: String,
    /// Argument document for the tool.
    pub args: Value,
}

/// Result of one function call, fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionResponse {
    /// Tool that was executed.
    pub name: String,
    /// `{"result": ...}` on success, `{"error": ...}` on failure.
    pub response: Value,
}

/// One model reply.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChatReply {
    /// Free text of the reply, when any.
    pub text: Option<String>,
    /// Function calls the model wants executed, in order.
    pub function_calls: Vec<FunctionCall>,
}

/// One message sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatMessage {
    /// The user's prompt text.
    User(String),
    /// Results of the previous turn's function calls.
    FunctionResponses(Vec<FunctionResponse>),
}

/// One tool declared to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: Option<String>,
    /// JSON schema of the tool's parameters.
    pub parameters: Value,
}

/// Per-conversation model configuration, passed with every message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatConfig {
    /// System instruction lines.
    pub system_instruction: Vec<String>,
    /// Tools the model may call.
    pub declarations: Vec<FunctionDeclaration>,
}

impl ChatConfig {
    /// Builds the configuration from the current tool list.
    ///
    /// `now` is rendered into the system instruction so the model can resolve
    /// relative dates.
    #[must_use]
    pub fn new(tools: &[ToolDescriptor], now: OffsetDateTime) -> Self {
        let system_instruction = vec![
            "You are an assistant embedded in a browser tab.".to_string(),
            "User prompts typically refer to the current tab unless stated otherwise.".to_string(),
            "Use your tools to query page content when you need it.".to_string(),
            format!("Today's date is: {}", formatted_date(now)),
            "CRITICAL RULE: Whenever the user provides a relative date (e.g., \"next Monday\", \
             \"tomorrow\", \"in 3 days\"), you must calculate the exact calendar date based on \
             today's date."
                .to_string(),
        ];
        let declarations = tools
            .iter()
            .map(|tool| FunctionDeclaration {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.as_ref().map_or_else(
                    || json!({"type": "object", "properties": {}}),
                    |schema| parse_input_schema(Some(schema)),
                ),
            })
            .collect();
        Self { system_instruction, declarations }
    }
}

/// Renders an instant like `Saturday, March 9, 2024`.
fn formatted_date(now: OffsetDateTime) -> String {
    let description = format_description!(
        "[weekday repr:long], [month repr:long] [day padding:none], [year]"
    );
    now.format(&description).unwrap_or_else(|_| now.date().to_string())
}

// ============================================================================
// SECTION: Model Trait
// ============================================================================

/// Failure talking to the chat model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The request never produced a reply.
    #[error("chat transport failed: {0}")]
    Transport(String),
}

/// Conversational model that may request function calls.
///
/// Implementations own conversation history; the loop passes the
/// configuration with every message.
#[async_trait]
pub trait ChatModel: Send {
    /// Sends one message and returns the model's reply.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError`] when the reply cannot be obtained.
    async fn send(
        &mut self,
        config: &ChatConfig,
        message: ChatMessage,
    ) -> Result<ChatReply, ChatError>;
}

// ============================================================================
// SECTION: Trace and Events
// ============================================================================

/// One entry of the exportable conversation trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TraceRecord {
    /// A message sent to the model.
    UserPrompt(Value),
    /// A reply received from the model.
    Response(Value),
    /// A transport failure.
    Error(String),
}

/// What happened during one prompt, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Free text from the model.
    AiText(String),
    /// The model requested a tool execution.
    ToolCall {
        /// Tool name.
        name: String,
        /// Argument document.
        args: Value,
    },
    /// A tool execution succeeded.
    ToolResult {
        /// Tool name.
        name: String,
        /// Raw output text.
        output: String,
    },
    /// A tool execution failed; the failure was reported to the model.
    ToolError {
        /// Tool name.
        name: String,
        /// Failure message.
        message: String,
    },
    /// The model replied with neither text nor function calls.
    EmptyReply,
    /// The loop stopped: transport failure or iteration cap.
    Error(String),
}

// ============================================================================
// SECTION: Chat Session
// ============================================================================

/// One conversation: configuration, trace, and the tool-calling loop.
#[derive(Debug)]
pub struct ChatSession {
    /// Configuration passed with every message.
    config: ChatConfig,
    /// Exportable record of every turn.
    trace: Vec<TraceRecord>,
    /// Iteration cap for one prompt.
    max_iterations: usize,
}

impl ChatSession {
    /// Creates a session with the default iteration cap.
    #[must_use]
    pub fn new(config: ChatConfig) -> Self {
        Self { config, trace: Vec::new(), max_iterations: DEFAULT_MAX_ITERATIONS }
    }

    /// Overrides the iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Replaces the configuration, e.g. after the tool list changed.
    pub fn set_config(&mut self, config: ChatConfig) {
        self.config = config;
    }

    /// Returns the conversation trace.
    #[must_use]
    pub fn trace(&self) -> &[TraceRecord] {
        &self.trace
    }

    /// Renders the trace as pretty JSON for export.
    #[must_use]
    pub fn export_trace(&self) -> String {
        serde_json::to_string_pretty(&self.trace).unwrap_or_else(|_| "[]".to_string())
    }

    /// Clears the trace, starting the conversation record over.
    pub fn reset(&mut self) {
        self.trace.clear();
    }

    /// Runs one prompt through the tool-calling loop.
    ///
    /// Never fails: transport errors end the loop with a
    /// [`ChatEvent::Error`], tool errors are fed back to the model, and the
    /// iteration cap ends the loop with an error event.
    pub async fn prompt(
        &mut self,
        model: &mut dyn ChatModel,
        host: &dyn ToolHost,
        audit: &dyn AuditSink,
        text: &str,
    ) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        let mut message = ChatMessage::User(text.to_string());
        for _ in 0..self.max_iterations {
            self.trace_message(&message);
            let reply = match model.send(&self.config, message).await {
                Ok(reply) => reply,
                Err(error) => {
                    let rendered = error.to_string();
                    self.trace.push(TraceRecord::Error(rendered.clone()));
                    events.push(ChatEvent::Error(rendered));
                    return events;
                }
            };
            self.trace.push(TraceRecord::Response(
                serde_json::to_value(&reply).unwrap_or(Value::Null),
            ));
            if let Some(reply_text) = &reply.text {
                events.push(ChatEvent::AiText(reply_text.trim().to_string()));
            }
            if reply.function_calls.is_empty() {
                if reply.text.is_none() {
                    events.push(ChatEvent::EmptyReply);
                }
                return events;
            }
            let responses = self.execute_calls(host, audit, reply.function_calls, &mut events).await;
            message = ChatMessage::FunctionResponses(responses);
        }
        events.push(ChatEvent::Error(format!(
            "tool-calling loop stopped after {} iterations",
            self.max_iterations
        )));
        events
    }

    /// Records an outgoing message in the trace.
    fn trace_message(&mut self, message: &ChatMessage) {
        self.trace.push(TraceRecord::UserPrompt(
            serde_json::to_value(message).unwrap_or(Value::Null),
        ));
    }

    /// Executes every requested call, emitting events and audit records.
    async fn execute_calls(
        &self,
        host: &dyn ToolHost,
        audit: &dyn AuditSink,
        calls: Vec<FunctionCall>,
        events: &mut Vec<ChatEvent>,
    ) -> Vec<FunctionResponse> {
        let mut responses = Vec::with_capacity(calls.len());
        for call in calls {
            let args_json = call.args.to_string();
            events.push(ChatEvent::ToolCall { name: call.name.clone(), args: call.args.clone() });
            match host.execute_tool(&call.name, &args_json).await {
                Ok(output) => {
                    audit.record(&ExecutionAuditEvent::new(
                        &call.name,
                        ExecutionOrigin::Chat,
                        true,
                        &args_json,
                        &output,
                    ));
                    events.push(ChatEvent::ToolResult {
                        name: call.name.clone(),
                        output: output.clone(),
                    });
                    responses.push(FunctionResponse {
                        name: call.name,
                        response: json!({ "result": output }),
                    });
                }
                Err(error) => {
                    let message = error.to_string();
                    audit.record(&ExecutionAuditEvent::new(
                        &call.name,
                        ExecutionOrigin::Chat,
                        false,
                        &args_json,
                        &message,
                    ));
                    events.push(ChatEvent::ToolError {
                        name: call.name.clone(),
                        message: message.clone(),
                    });
                    responses.push(FunctionResponse {
                        name: call.name,
                        response: json!({ "error": message }),
                    });
                }
            }
        }
        responses
    }
}
