//! `parley history` — Print the stored conversation.

use super::{load_config, open_transcript};
use crate::render;
use parley_core::transcript::TranscriptStore;

pub async fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let store = open_transcript(&config)?;
    let messages = store.get_messages().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("  (no messages yet)");
        return Ok(());
    }

    render::print_history(&messages);
    Ok(())
}
