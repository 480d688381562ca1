//! Transcript store trait — the persisted, ordered conversation.
//!
//! From the agent's point of view the transcript is append-only: messages
//! are never edited, reordered, or removed during a turn.

use async_trait::async_trait;
use crate::error::StoreError;
use crate::message::Message;

/// The core TranscriptStore trait.
///
/// Implementations: in-memory (tests, evaluation runs) and a JSON file.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// All messages, oldest first.
    async fn get_messages(&self) -> Result<Vec<Message>, StoreError>;

    /// Append messages in order and persist them.
    async fn add_messages(&self, messages: Vec<Message>) -> Result<(), StoreError>;

    /// Append the `tool` message answering `tool_call_id`.
    async fn save_tool_response(
        &self,
        tool_call_id: &str,
        content: &str,
    ) -> Result<(), StoreError> {
        self.add_messages(vec![Message::tool_result(tool_call_id, content)])
            .await
    }

    /// Remove every message. Used only between conversations.
    async fn clear(&self) -> Result<(), StoreError>;
}
