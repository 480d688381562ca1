//! `parley tools` — List the tools the agent can call.

use super::{http_client, load_config, open_transcript};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let registry = parley_tools::default_registry(
        &config,
        http_client(&config)?,
        open_transcript(&config)?,
    );

    println!("  {} tools available:\n", registry.len());
    for def in registry.definitions() {
        let gate = if registry.requires_approval(&def.name) {
            " [needs approval]"
        } else {
            ""
        };
        println!("  {}{gate}", def.name);
        println!("      {}", def.description);
    }
    if config.vector.url.is_none() || config.vector.token.is_none() {
        println!("\n  Note: movie_search and redditSearch need a vector index (UPSTASH_VECTOR_REST_URL / _TOKEN).");
    }
    Ok(())
}
