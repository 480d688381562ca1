//! The agent turn loop implementation.

use crate::approval::{ApprovalFlow, pending_approval};
use crate::completion::ModelCompletion;
use parley_core::approval::ApprovalGate;
use parley_core::error::StoreError;
use parley_core::event::{DomainEvent, EventBus};
use parley_core::message::{Message, ToolCall};
use parley_core::tool::ToolRegistry;
use parley_core::transcript::TranscriptStore;
use parley_memory::InMemoryTranscript;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tool response for calls after the first on the same reply.
pub const SKIPPED_NOTICE: &str = "Not executed: only one tool call is run per turn.";

/// Tool response for calls on a reply whose content already ended the turn.
pub const SUPERSEDED_NOTICE: &str = "Not executed: the reply already answered the user.";

/// Drives one conversation: model calls, tool dispatch, approval pauses.
///
/// A call to [`AgentLoop::run`] ends in one of three ways:
/// - the model gives a terminal reply (non-empty content)
/// - the model asks for an approval-gated tool, and the turn pauses
/// - the model gives no reply at all (fatal interruption)
///
/// An optional round limit adds a fourth exit after that many tool
/// dispatches.
pub struct AgentLoop {
    /// Model round trip, system prompt included
    completion: ModelCompletion,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// The persisted conversation
    store: Arc<dyn TranscriptStore>,

    /// Resolves paused gated calls
    approval: ApprovalFlow,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,

    /// Tool dispatches allowed per run; `None` is unbounded
    max_tool_rounds: Option<u32>,
}

impl AgentLoop {
    pub fn new(
        completion: ModelCompletion,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn TranscriptStore>,
        gate: Arc<dyn ApprovalGate>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            completion,
            approval: ApprovalFlow::new(gate, tools.clone(), event_bus.clone()),
            tools,
            store,
            event_bus,
            max_tool_rounds: None,
        }
    }

    /// Cap tool dispatches per run. `None` removes the cap.
    pub fn with_max_tool_rounds(mut self, max: Option<u32>) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// Process one user message against the persisted transcript.
    ///
    /// If the transcript is paused on a gated tool call, `user_message` is
    /// the approval reply and is not stored as a user message. Returns the
    /// full transcript. Only store failures are errors.
    pub async fn run(&self, user_message: &str) -> parley_core::Result<Vec<Message>> {
        let history = self.store.get_messages().await?;
        info!(store = self.store.name(), messages = history.len(), "Running agent");

        let handled = match pending_approval(&history, &self.tools) {
            Some(pending) => {
                let handled = self
                    .approval
                    .resolve(self.store.as_ref(), pending, user_message)
                    .await?;
                if let Some(paused) = history.last() {
                    answer_unrun(self.store.as_ref(), &paused.tool_calls[1..], SKIPPED_NOTICE).await?;
                }
                handled
            }
            None => false,
        };

        if !handled {
            self.store
                .add_messages(vec![Message::user(user_message)])
                .await?;
        }

        self.turn_loop(self.store.as_ref(), user_message).await
    }

    /// Run the same loop on a throwaway transcript holding only
    /// `user_message`. Nothing is persisted and nothing is resumed.
    pub async fn run_eval(&self, user_message: &str) -> parley_core::Result<Vec<Message>> {
        let scratch = InMemoryTranscript::with_messages(vec![Message::user(user_message)]);
        self.turn_loop(&scratch, user_message).await
    }

    async fn turn_loop(
        &self,
        store: &dyn TranscriptStore,
        user_message: &str,
    ) -> parley_core::Result<Vec<Message>> {
        let definitions = self.tools.definitions();
        let mut rounds: u32 = 0;

        loop {
            let transcript = store.get_messages().await?;
            debug!(round = rounds, messages = transcript.len(), "Agent loop iteration");

            let Some(response) = self.completion.complete(&transcript, &definitions).await else {
                warn!(round = rounds, "Model returned nothing, stopping turn");
                self.event_bus.publish(DomainEvent::RunInterrupted {
                    reason: "model completion failed".into(),
                    timestamp: chrono::Utc::now(),
                });
                return Ok(transcript);
            };

            if let Some(usage) = &response.usage {
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    model: response.model.clone(),
                    tokens_used: usage.total_tokens,
                    timestamp: chrono::Utc::now(),
                });
            }

            let reply = response.message;
            store.add_messages(vec![reply.clone()]).await?;

            // Content wins over any tool calls on the same reply
            if reply.is_terminal() {
                answer_unrun(store, &reply.tool_calls, SUPERSEDED_NOTICE).await?;
                return Ok(store.get_messages().await?);
            }

            let Some(call) = reply.first_tool_call() else {
                warn!(round = rounds, "Model reply had neither content nor a tool call");
                return Ok(store.get_messages().await?);
            };
            if reply.tool_calls.len() > 1 {
                debug!(
                    tool = %call.name(),
                    ignored = reply.tool_calls.len() - 1,
                    "Honoring only the first tool call"
                );
            }
            // A gated call leaves the others unanswered until the approval
            // reply resolves it in `run`

            if self.tools.requires_approval(call.name()) {
                info!(tool = %call.name(), call_id = %call.id, "Pausing for user approval");
                self.event_bus.publish(DomainEvent::ApprovalRequested {
                    tool_name: call.name().to_string(),
                    call_id: call.id.clone(),
                    timestamp: chrono::Utc::now(),
                });
                return Ok(store.get_messages().await?);
            }

            info!(tool = %call.name(), call_id = %call.id, "executing tool");
            let start = Instant::now();
            let output = self.tools.dispatch(call, user_message).await;
            self.event_bus.publish(DomainEvent::ToolExecuted {
                tool_name: call.name().to_string(),
                call_id: call.id.clone(),
                duration_ms: start.elapsed().as_millis() as u64,
                timestamp: chrono::Utc::now(),
            });
            store.save_tool_response(&call.id, &output).await?;
            answer_unrun(store, &reply.tool_calls[1..], SKIPPED_NOTICE).await?;

            rounds += 1;
            if self.max_tool_rounds.is_some_and(|max| rounds >= max) {
                warn!(rounds, "Tool round limit reached, stopping turn");
                self.event_bus.publish(DomainEvent::RunInterrupted {
                    reason: format!("tool round limit of {rounds} reached"),
                    timestamp: chrono::Utc::now(),
                });
                return Ok(store.get_messages().await?);
            }
        }
    }
}

/// Store `notice` as the response to each call that was not dispatched, so
/// no call is left unanswered when the model is asked again.
async fn answer_unrun(store: &dyn TranscriptStore, calls: &[ToolCall], notice: &str) -> Result<(), StoreError> {
    if calls.is_empty() {
        return Ok(());
    }
    debug!(count = calls.len(), notice, "Answering tool calls that were not run");
    let responses = calls
        .iter()
        .map(|call| Message::tool_result(call.id.clone(), notice))
        .collect();
    store.add_messages(responses).await
}
