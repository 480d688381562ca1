//! Built-in tool implementations for Parley.
//!
//! Tools give the agent the ability to reach outside the conversation:
//! generate images, tell jokes, search the movie and Reddit indexes,
//! and chart the results of a previous search.
//!
//! Image generation is the only tool that spends money, so it is the
//! only one that asks for approval first.

pub mod chart_generator;
pub mod dad_joke;
pub mod generate_image;
pub mod ingest;
pub mod movie_search;
pub mod reddit_search;
pub mod vector;

#[cfg(test)]
mod test_support;

use parley_config::AppConfig;
use parley_core::tool::ToolRegistry;
use parley_core::transcript::TranscriptStore;
use std::sync::Arc;
use vector::{UpstashVectorClient, VectorIndex};

/// Create the registry with every built-in tool.
///
/// One HTTP client is shared by all tools. The search tools are always
/// registered; without vector credentials they report themselves as not
/// configured when called. The chart tool reads from `transcript`.
pub fn default_registry(
    config: &AppConfig,
    client: reqwest::Client,
    transcript: Arc<dyn TranscriptStore>,
) -> ToolRegistry {
    let index: Option<Arc<dyn VectorIndex>> =
        UpstashVectorClient::from_config(&config.vector, client.clone())
            .map(|c| Arc::new(c) as Arc<dyn VectorIndex>);
    let top_k = config.vector.top_k;

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(generate_image::GenerateImageTool::new(
        &config.base_url,
        config.api_key.clone(),
        &config.image,
        client.clone(),
    )));
    registry.register(Box::new(dad_joke::DadJokeTool::new(
        &config.services.dad_joke_url,
        client.clone(),
    )));
    registry.register(Box::new(movie_search::MovieSearchTool::new(
        index.clone(),
        top_k,
    )));
    registry.register(Box::new(reddit_search::RedditSearchTool::new(index, top_k)));
    registry.register(Box::new(chart_generator::ChartGeneratorTool::new(
        transcript,
        &config.services.quickchart_url,
        client,
    )));
    registry
}
