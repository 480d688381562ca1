//! Shared test helpers for agent tests.

use async_trait::async_trait;
use parley_core::approval::ApprovalGate;
use parley_core::error::{ProviderError, ToolError};
use parley_core::message::{Message, ToolCall};
use parley_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use parley_core::tool::{Tool, ToolInput, ToolResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A provider that replays a scripted sequence of outcomes.
///
/// Every request is recorded. Panics if called more often than scripted.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failure after the scripted responses.
    pub fn then_fail(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(ProviderError::Network("connection reset".into())));
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider: no response scripted for call #{call}"))
    }
}

fn respond(message: Message) -> ProviderResponse {
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A terminal reply.
pub fn text_response(text: &str) -> ProviderResponse {
    respond(Message::assistant(text))
}

/// A reply requesting the given tool calls, with no content.
pub fn tool_call_response(calls: Vec<ToolCall>) -> ProviderResponse {
    respond(Message::assistant_tool_calls(calls))
}

pub fn tool_call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall::new(id, name, args.to_string())
}

/// A tool that returns fixed output and records every invocation.
pub struct RecordingTool {
    name: String,
    output: String,
    gated: bool,
    inputs: Mutex<Vec<ToolInput>>,
}

impl RecordingTool {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            gated: false,
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(name: &str, output: &str) -> Self {
        Self {
            gated: true,
            ..Self::new(name, output)
        }
    }

    pub fn call_count(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    pub fn last_input(&self) -> Option<ToolInput> {
        self.inputs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Records its calls"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    fn requires_approval(&self) -> bool {
        self.gated
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolResult, ToolError> {
        self.inputs.lock().unwrap().push(input);
        Ok(ToolResult::ok(self.output.clone()))
    }
}

/// Lets a test keep a handle on a tool the registry owns.
pub struct SharedTool(pub Arc<RecordingTool>);

#[async_trait]
impl Tool for SharedTool {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.0.parameters_schema()
    }

    fn requires_approval(&self) -> bool {
        self.0.requires_approval()
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolResult, ToolError> {
        self.0.execute(input).await
    }
}

/// An approval gate with a fixed answer.
pub struct StaticGate(pub bool);

#[async_trait]
impl ApprovalGate for StaticGate {
    async fn is_approved(&self, _user_reply: &str) -> bool {
        self.0
    }
}
