//! Parley CLI — the main entry point.
//!
//! Commands:
//! - `ask`      — Send one message to the agent (or answer an approval prompt)
//! - `history`  — Print the stored conversation
//! - `reset`    — Forget the stored conversation
//! - `onboard`  — Write a default config file
//! - `tools`    — List the tools the agent can call
//! - `ingest`   — Load a Reddit comments CSV into the vector index

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod render;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley — a tool-calling chat agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to the agent
    Ask {
        /// The message, or your yes/no answer to a pending approval
        message: String,

        /// Run against a fresh transcript without reading or saving history
        #[arg(long)]
        eval: bool,
    },

    /// Show the stored conversation
    History {
        /// Print the raw JSON messages
        #[arg(long)]
        json: bool,
    },

    /// Clear the stored conversation
    Reset,

    /// Initialize configuration
    Onboard,

    /// List available tools
    Tools,

    /// Index an enriched Reddit comments CSV for redditSearch
    Ingest {
        /// Path to the CSV file
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for the conversation
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask { message, eval } => commands::ask::run(&message, eval).await?,
        Commands::History { json } => commands::history::run(json).await?,
        Commands::Reset => commands::reset::run().await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Tools => commands::tools::run().await?,
        Commands::Ingest { csv } => commands::ingest::run(&csv).await?,
    }

    Ok(())
}
