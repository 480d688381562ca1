//! `parley ask` — One agent run for one message.

use super::{http_client, load_config, open_transcript};
use crate::render;
use parley_agent::{AgentLoop, LlmApprovalGate, ModelCompletion, pending_approval};
use parley_config::AppConfig;
use parley_core::event::EventBus;
use parley_core::transcript::TranscriptStore;
use std::sync::Arc;

pub async fn run(message: &str, eval: bool) -> Result<(), Box<dyn std::error::Error>> {
    if message.trim().is_empty() {
        return Err("Message must not be empty".into());
    }

    let config = load_config()?;
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (a .env file works too):");
        eprintln!("    PARLEY_API_KEY=sk-...");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let client = http_client(&config)?;
    let store = open_transcript(&config)?;
    let provider = Arc::new(parley_providers::build_from_config(&config, client.clone())?);

    let tools = Arc::new(parley_tools::default_registry(&config, client, store.clone()));

    let mut completion = ModelCompletion::new(provider.clone(), &config.model)
        .with_temperature(config.temperature);
    if let Some(prompt) = &config.system_prompt {
        completion = completion.with_system_prompt(prompt);
    }

    let agent = AgentLoop::new(
        completion,
        tools.clone(),
        store.clone(),
        Arc::new(LlmApprovalGate::new(provider, &config.model)),
        Arc::new(EventBus::default()),
    )
    .with_max_tool_rounds(config.tool_round_limit());

    if eval {
        let messages = agent.run_eval(message).await?;
        render::print_messages(&messages, &tools);
        return Ok(());
    }

    let before = store.get_messages().await?;
    if pending_approval(&before, &tools).is_some() {
        eprintln!("  Processing approval...");
    }

    let messages = agent.run(message).await?;
    let new = messages.get(before.len()..).unwrap_or_default();
    if new.is_empty() {
        eprintln!("  [No reply from the model. Try again.]");
    }
    render::print_messages(new, &tools);
    Ok(())
}
