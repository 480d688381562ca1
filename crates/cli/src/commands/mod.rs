//! CLI command implementations.

pub mod ask;
pub mod history;
pub mod ingest;
pub mod onboard;
pub mod reset;
pub mod tools;

use parley_config::AppConfig;
use parley_memory::FileTranscript;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

pub(crate) fn load_config() -> CommandResult<AppConfig> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Open the transcript file named by the config.
pub(crate) fn open_transcript(config: &AppConfig) -> CommandResult<Arc<FileTranscript>> {
    let path = config.transcript_path();
    let store = FileTranscript::open(&path)
        .map_err(|e| format!("Failed to open transcript at {}: {e}", path.display()))?;
    debug!(path = %path.display(), "Opened transcript");
    Ok(Arc::new(store))
}

/// The one HTTP client every service call goes through.
pub(crate) fn http_client(config: &AppConfig) -> CommandResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.services.timeout_secs))
        .build()?)
}
