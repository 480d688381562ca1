//! `parley reset` — Forget the stored conversation.

use super::{CommandResult, load_config};
use parley_core::error::StoreError;
use parley_core::transcript::TranscriptStore;
use parley_memory::FileTranscript;
use std::path::Path;
use tracing::warn;

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Cleared(usize),
    Replaced,
}

pub async fn run() -> CommandResult<()> {
    let config = load_config()?;
    let path = config.transcript_path();

    match reset_transcript(&path).await? {
        Outcome::Cleared(count) => println!("  Cleared {count} messages from {}", path.display()),
        Outcome::Replaced => println!("  Replaced unreadable transcript at {}", path.display()),
    }
    Ok(())
}

async fn reset_transcript(path: &Path) -> CommandResult<Outcome> {
    match FileTranscript::open(path) {
        Ok(store) => {
            let count = store.get_messages().await?.len();
            store.clear().await?;
            Ok(Outcome::Cleared(count))
        }
        // Corrupted files are replaced unread
        Err(StoreError::Corrupted(reason)) => {
            warn!(path = %path.display(), %reason, "Transcript unreadable, replacing it");
            FileTranscript::discard(path)?;
            Ok(Outcome::Replaced)
        }
        Err(e) => Err(e.into()),
    }
}
