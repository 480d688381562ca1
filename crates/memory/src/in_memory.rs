//! In-memory transcript — useful for testing and evaluation runs.

use async_trait::async_trait;
use parley_core::error::StoreError;
use parley_core::message::Message;
use parley_core::transcript::TranscriptStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A transcript held in a Vec. Nothing survives the process.
pub struct InMemoryTranscript {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryTranscript {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Start from an existing history.
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Arc::new(RwLock::new(messages)),
        }
    }
}

impl Default for InMemoryTranscript {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscript {
    fn name(&self) -> &str { "in_memory" }

    async fn get_messages(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self.messages.read().await.clone())
    }

    async fn add_messages(&self, messages: Vec<Message>) -> Result<(), StoreError> {
        self.messages.write().await.extend(messages);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.messages.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::message::Role;

    #[tokio::test]
    async fn appends_in_order() {
        let store = InMemoryTranscript::new();
        store.add_messages(vec![Message::user("first")]).await.unwrap();
        store
            .add_messages(vec![Message::assistant("second"), Message::user("third")])
            .await
            .unwrap();

        let messages = store.get_messages().await.unwrap();
        let texts: Vec<_> = messages.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn save_tool_response_appends_tool_message() {
        let store = InMemoryTranscript::new();
        store.save_tool_response("call_1", "a joke").await.unwrap();

        let messages = store.get_messages().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Tool);
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(messages[0].text(), "a joke");
    }

    #[tokio::test]
    async fn clear_empties_transcript() {
        let store = InMemoryTranscript::with_messages(vec![Message::user("hi")]);
        store.clear().await.unwrap();
        assert!(store.get_messages().await.unwrap().is_empty());
    }
}
