//! Tool trait and registry — the capabilities the model may invoke.
//!
//! Every tool has the same shape: a name, a description, a JSON Schema for
//! its arguments, and an async `execute`. The registry maps names to tools
//! and turns any [`ToolCall`] into a result string, never an error, so a bad
//! call becomes something the model can read and correct.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use crate::error::ToolError;
use crate::message::ToolCall;
use crate::provider::ToolDefinition;

/// Returned when the model names a tool that is not registered.
///
/// `{name}` is replaced with the requested tool name.
pub const UNKNOWN_TOOL_SENTINEL: &str = "Never run this tool: {name} again, or else!";

/// What a tool receives when invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    /// The user message that led to this call (the approval reply, for gated tools)
    pub user_message: String,

    /// Parsed arguments; always a JSON object
    pub tool_args: serde_json::Value,
}

impl ToolInput {
    /// Deserialize the arguments into a tool's typed argument struct.
    pub fn args<T: serde::de::DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(self.tool_args.clone())
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool did what was asked
    pub success: bool,

    /// The text handed back to the model
    pub output: String,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    /// A handled failure: the tool caught its own I/O error and describes it.
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "dad_joke").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Whether the user must approve each call before it runs.
    fn requires_approval(&self) -> bool {
        false
    }

    /// Execute the tool.
    ///
    /// Service and I/O failures should come back as [`ToolResult::failed`];
    /// `Err` is for calls the tool cannot even attempt.
    async fn execute(&self, input: ToolInput) -> Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the model
/// 2. Learn which tools are approval-gated
/// 3. Dispatch tool calls the model requests
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Whether calls to `name` must wait for user approval.
    pub fn requires_approval(&self, name: &str) -> bool {
        self.get(name).is_some_and(|t| t.requires_approval())
    }

    /// All tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call, surfacing failures as `ToolError`.
    pub async fn execute(
        &self,
        call: &ToolCall,
        user_message: &str,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(call.name())
            .ok_or_else(|| ToolError::NotFound(call.name().to_string()))?;
        let tool_args = parse_arguments(&call.function.arguments)?;
        tool.execute(ToolInput {
            user_message: user_message.to_string(),
            tool_args,
        })
        .await
    }

    /// Dispatch a tool call and return the text for its `tool` message.
    ///
    /// Never fails: an unknown name yields [`UNKNOWN_TOOL_SENTINEL`], bad
    /// arguments or a tool error yield an `Error: ...` string. One attempt.
    pub async fn dispatch(&self, call: &ToolCall, user_message: &str) -> String {
        match self.execute(call, user_message).await {
            Ok(result) => {
                debug!(tool = %call.name(), call_id = %call.id, success = result.success, "Tool dispatched");
                result.output
            }
            Err(ToolError::NotFound(name)) => {
                warn!(tool = %name, call_id = %call.id, "Model requested an unknown tool");
                UNKNOWN_TOOL_SENTINEL.replace("{name}", &name)
            }
            Err(ToolError::InvalidArguments(reason)) => {
                warn!(tool = %call.name(), call_id = %call.id, %reason, "Rejected tool arguments");
                format!("Error: invalid arguments for {}: {reason}", call.name())
            }
            Err(e) => {
                warn!(tool = %call.name(), call_id = %call.id, error = %e, "Tool execution failed");
                format!("Error: {e}")
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse raw model arguments into a JSON object. Empty text means `{}`.
fn parse_arguments(raw: &str) -> Result<serde_json::Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    if !value.is_object() {
        return Err(ToolError::InvalidArguments(
            "arguments must be a JSON object".into(),
        ));
    }
    Ok(value)
}
