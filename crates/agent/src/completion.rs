//! Model completion — one chat-completion round trip for the agent loop.
//!
//! Builds the request (system prompt, transcript, tool schemas) and calls the
//! provider. A failed call is logged and reported as `None`; the loop treats
//! that as a fatal interruption of the turn.

use chrono::{Local, NaiveDate};
use parley_core::message::{Message, Role};
use parley_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use std::sync::Arc;
use tracing::{debug, warn};

/// The persona and rules the model sees at the top of every request.
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant called Troll. Follow these instructions:
- don't use celebrity names in image generation prompts, instead replace them with generic character traits";

/// Render the system prompt for `today`.
pub fn system_prompt(base: Option<&str>, today: NaiveDate) -> String {
    format!(
        "{}\n\n<context>\n    todays date: {}\n</context>",
        base.unwrap_or(DEFAULT_SYSTEM_PROMPT),
        today.format("%Y-%m-%d")
    )
}

pub struct ModelCompletion {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    system_prompt: Option<String>,
}

impl ModelCompletion {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.1,
            system_prompt: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the built-in persona. The date context is still appended.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Assemble the request for one round.
    ///
    /// Stored system messages are dropped; the prompt is always rebuilt so
    /// the date stays current.
    pub fn build_request(&self, transcript: &[Message], tools: &[ToolDefinition]) -> ProviderRequest {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(Message::system(system_prompt(
            self.system_prompt.as_deref(),
            Local::now().date_naive(),
        )));
        messages.extend(transcript.iter().filter(|m| m.role != Role::System).cloned());

        let mut request = ProviderRequest::new(&self.model, messages);
        request.temperature = self.temperature;
        request.tools = tools.to_vec();
        request.parallel_tool_calls = false;
        request
    }

    /// Ask the model for the next assistant message.
    pub async fn complete(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Option<ProviderResponse> {
        let request = self.build_request(transcript, tools);
        debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Requesting completion"
        );

        match self.provider.complete(request).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Completion failed");
                None
            }
        }
    }
}
