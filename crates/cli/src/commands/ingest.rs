//! `parley ingest` — Load a Reddit comments CSV into the vector index.

use super::{CommandResult, http_client, load_config};
use parley_tools::ingest::ingest_reddit_comments;
use parley_tools::vector::UpstashVectorClient;
use std::path::Path;

pub async fn run(csv_path: &Path) -> CommandResult<()> {
    let config = load_config()?;
    let Some(index) = UpstashVectorClient::from_config(&config.vector, http_client(&config)?) else {
        eprintln!();
        eprintln!("  No vector index configured.");
        eprintln!("  Set UPSTASH_VECTOR_REST_URL and UPSTASH_VECTOR_REST_TOKEN, or the [vector] section of the config.");
        eprintln!();
        std::process::exit(1);
    };

    let file = std::fs::File::open(csv_path)
        .map_err(|e| format!("Failed to open {}: {e}", csv_path.display()))?;

    println!("  Indexing Reddit comments from {} ...", csv_path.display());
    let report = ingest_reddit_comments(&index, file).await?;
    println!("  Indexed {} comments ({} failed)", report.indexed, report.failed);
    Ok(())
}
