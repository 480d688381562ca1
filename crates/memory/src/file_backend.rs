//! File-based transcript — one JSON document on disk.
//!
//! The file holds `{ "messages": [ ... ] }`, each message stamped with its
//! `id` and `createdAt`. The document is loaded once on open and rewritten on
//! every append. Each rewrite goes to a temp file in the same directory that
//! is then renamed over the old one, so the file on disk is always a whole
//! document and a crash loses at most the message being written.
//!
//! The default location, `~/.parley/db.json`, is chosen by the config crate.

use async_trait::async_trait;
use parley_core::error::StoreError;
use parley_core::message::Message;
use parley_core::transcript::TranscriptStore;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    messages: Vec<Message>,
}

/// A file-backed transcript store.
///
/// Messages are held in memory and flushed to disk on every mutation.
pub struct FileTranscript {
    path: PathBuf,
    messages: Arc<RwLock<Vec<Message>>>,
}

impl FileTranscript {
    /// Open the transcript at `path`.
    ///
    /// A missing file starts an empty transcript (the file is created on the
    /// first write). A file that exists but cannot be parsed is an error:
    /// it is never silently replaced.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let messages = Self::load_from_disk(&path)?;
        debug!(path = %path.display(), count = messages.len(), "File transcript loaded");
        Ok(Self {
            path,
            messages: Arc::new(RwLock::new(messages)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Result<Vec<Message>, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Read(format!("{}: {e}", path.display()))),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let doc: Document = serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupted(format!("{}: {e}", path.display())))?;
        Ok(doc.messages)
    }

    /// Replace whatever is at `path` with an empty transcript.
    ///
    /// The old file is not parsed, so this recovers from a corrupted one.
    pub fn discard(path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Discarding transcript file");
        write_document(path, &[])
    }

    fn flush(&self, messages: &[Message]) -> Result<(), StoreError> {
        write_document(&self.path, messages)
    }
}

/// Write the whole document to `path` atomically.
fn write_document(path: &Path, messages: &[Message]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| StoreError::Write(format!("Failed to create transcript directory: {e}")))?;

    #[derive(Serialize)]
    struct DocumentRef<'a> {
        messages: &'a [Message],
    }

    let content = serde_json::to_string_pretty(&DocumentRef { messages })
        .map_err(|e| StoreError::Write(format!("Failed to serialize transcript: {e}")))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| StoreError::Write(format!("Failed to create temp transcript file: {e}")))?;
    tmp.write_all(content.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| StoreError::Write(format!("Failed to write transcript file: {e}")))?;
    tmp.persist(path)
        .map_err(|e| StoreError::Write(format!("Failed to replace transcript file: {}", e.error)))?;
    Ok(())
}

#[async_trait]
impl TranscriptStore for FileTranscript {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_messages(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self.messages.read().await.clone())
    }

    async fn add_messages(&self, messages: Vec<Message>) -> Result<(), StoreError> {
        let mut current = self.messages.write().await;
        let before = current.len();
        current.extend(messages);
        if let Err(e) = self.flush(&current) {
            // Keep memory and disk in step
            current.truncate(before);
            return Err(e);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut current = self.messages.write().await;
        self.flush(&[])?;
        current.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::message::{Role, ToolCall};
    use tempfile::TempDir;

    fn temp_path(dir: &TempDir) -> PathBuf {
        dir.path().join("db.json")
    }

    #[tokio::test]
    async fn append_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);

        let store = FileTranscript::open(&path).unwrap();
        store.add_messages(vec![Message::user("tell me a joke")]).await.unwrap();
        store
            .add_messages(vec![Message::assistant_tool_calls(vec![ToolCall::new(
                "call_1", "dad_joke", "{}",
            )])])
            .await
            .unwrap();
        store.save_tool_response("call_1", "Why did the crab never share?").await.unwrap();

        let reopened = FileTranscript::open(&path).unwrap();
        let messages = reopened.get_messages().await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].tool_calls[0].function.name, "dad_joke");
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn file_uses_messages_document_shape() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);

        let store = FileTranscript::open(&path).unwrap();
        store.add_messages(vec![Message::user("hi")]).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["messages"][0]["role"], "user");
        assert_eq!(raw["messages"][0]["content"], "hi");
        assert!(raw["messages"][0]["id"].is_string());
        assert!(raw["messages"][0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileTranscript::open(dir.path().join("nested").join("db.json")).unwrap();
        assert!(store.get_messages().await.unwrap().is_empty());

        // Parent directories are created on first write
        store.add_messages(vec![Message::user("hi")]).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn corrupted_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        std::fs::write(&path, "this is not json").unwrap();

        let err = FileTranscript::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Corrupted(_)));
        // Nothing was overwritten
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "this is not json");
    }

    #[tokio::test]
    async fn clear_persists() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);

        let store = FileTranscript::open(&path).unwrap();
        store.add_messages(vec![Message::user("one"), Message::user("two")]).await.unwrap();
        store.clear().await.unwrap();

        let reopened = FileTranscript::open(&path).unwrap();
        assert!(reopened.get_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_leave_only_the_transcript_file() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);

        let store = FileTranscript::open(&path).unwrap();
        for i in 0..3 {
            store.add_messages(vec![Message::user(format!("message {i}"))]).await.unwrap();
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("db.json")]);
        assert_eq!(FileTranscript::open(&path).unwrap().get_messages().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_document() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        let store = FileTranscript::open(&path).unwrap();
        store.add_messages(vec![Message::user("kept")]).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        // A directory where the transcript should be makes the rename fail
        let blocked = FileTranscript::open(dir.path().join("blocked")).unwrap();
        std::fs::create_dir(blocked.path()).unwrap();
        assert!(blocked.add_messages(vec![Message::user("lost")]).await.is_err());
        assert!(blocked.get_messages().await.unwrap().is_empty());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn discard_recovers_truncated_file() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        std::fs::write(&path, r#"{"messages": [{"id":"m1","role":"us"#).unwrap();
        assert!(matches!(FileTranscript::open(&path), Err(StoreError::Corrupted(_))));

        FileTranscript::discard(&path).unwrap();

        let store = FileTranscript::open(&path).unwrap();
        assert!(store.get_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn loads_document_without_metadata() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        std::fs::write(
            &path,
            r#"{"messages":[{"id":"1","role":"user","content":"hello"}]}"#,
        )
        .unwrap();

        let store = FileTranscript::open(&path).unwrap();
        let messages = store.get_messages().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text(), "hello");
    }
}
