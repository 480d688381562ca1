//! Approval hand-off for gated tools.
//!
//! When a turn pauses on a gated tool call, the user's next message is not
//! conversation: it is the answer to "may I run this?". [`ApprovalFlow`]
//! classifies that answer, runs or refuses the tool, and writes exactly one
//! `tool` message for the pending call either way.

use async_trait::async_trait;
use parley_core::approval::ApprovalGate;
use parley_core::error::StoreError;
use parley_core::event::{DomainEvent, EventBus};
use parley_core::message::{Message, Role, ToolCall};
use parley_core::provider::{Provider, ProviderRequest};
use parley_core::tool::ToolRegistry;
use parley_core::transcript::TranscriptStore;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Tool response recorded when the user declines.
pub const DENIAL_NOTICE: &str = "User did not approve image generation at this time.";

const CLASSIFIER_INSTRUCTION: &str =
    "Determine if the user approved the image generation. If you are not sure, then it is not approved.";

/// The gated tool call the transcript is waiting on, if any.
///
/// That is the case exactly when the last message is from the assistant and
/// its first tool call names an approval-gated tool.
pub fn pending_approval<'a>(transcript: &'a [Message], tools: &ToolRegistry) -> Option<&'a ToolCall> {
    let last = transcript.last()?;
    if last.role != Role::Assistant {
        return None;
    }
    last.first_tool_call()
        .filter(|call| tools.requires_approval(call.name()))
}

pub struct ApprovalFlow {
    gate: Arc<dyn ApprovalGate>,
    tools: Arc<ToolRegistry>,
    event_bus: Arc<EventBus>,
}

impl ApprovalFlow {
    pub fn new(gate: Arc<dyn ApprovalGate>, tools: Arc<ToolRegistry>, event_bus: Arc<EventBus>) -> Self {
        Self {
            gate,
            tools,
            event_bus,
        }
    }

    /// Answer `pending` using `user_reply`.
    ///
    /// Always consumes the reply and returns `true`; the caller must not
    /// also append it as a user message.
    pub async fn resolve(
        &self,
        store: &dyn TranscriptStore,
        pending: &ToolCall,
        user_reply: &str,
    ) -> Result<bool, StoreError> {
        let approved = self.gate.is_approved(user_reply).await;
        info!(tool = %pending.name(), call_id = %pending.id, approved, "Approval resolved");
        self.event_bus.publish(DomainEvent::ApprovalResolved {
            tool_name: pending.name().to_string(),
            call_id: pending.id.clone(),
            approved,
            timestamp: chrono::Utc::now(),
        });

        let response = if approved {
            let start = Instant::now();
            let output = self.tools.dispatch(pending, user_reply).await;
            self.event_bus.publish(DomainEvent::ToolExecuted {
                tool_name: pending.name().to_string(),
                call_id: pending.id.clone(),
                duration_ms: start.elapsed().as_millis() as u64,
                timestamp: chrono::Utc::now(),
            });
            output
        } else {
            DENIAL_NOTICE.to_string()
        };

        store.save_tool_response(&pending.id, &response).await?;
        Ok(true)
    }
}

/// Classifies approval replies with a structured-output model call.
pub struct LlmApprovalGate {
    provider: Arc<dyn Provider>,
    model: String,
}

impl LlmApprovalGate {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn request(&self, user_reply: &str) -> ProviderRequest {
        let mut request = ProviderRequest::new(
            &self.model,
            vec![
                Message::system(CLASSIFIER_INSTRUCTION),
                Message::user(user_reply),
            ],
        );
        request.response_format = Some(serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": "approval",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "approved": {
                            "type": "boolean",
                            "description": "did the user approve the action or not"
                        }
                    },
                    "required": ["approved"],
                    "additionalProperties": false
                }
            }
        }));
        request
    }
}

#[derive(Deserialize)]
struct Verdict {
    approved: bool,
}

#[async_trait]
impl ApprovalGate for LlmApprovalGate {
    async fn is_approved(&self, user_reply: &str) -> bool {
        let response = match self.provider.complete(self.request(user_reply)).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Approval check failed, treating as denied");
                return false;
            }
        };

        match serde_json::from_str::<Verdict>(response.message.text()) {
            Ok(verdict) => verdict.approved,
            Err(e) => {
                warn!(error = %e, reply = %response.message.text(), "Unreadable approval verdict, treating as denied");
                false
            }
        }
    }
}
