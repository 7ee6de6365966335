//! PromptWeave CLI — the main entry point.
//!
//! Commands:
//! - `run`  — One-shot or interactive agent session
//! - `pull` — Pull the configured model onto the Ollama server

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "promptweave",
    about = "PromptWeave — budgeted prompt assembly and agent control loop",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "PROMPTWEAVE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent, one-shot or interactively
    Run {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override the Ollama endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// Override the model name
        #[arg(long)]
        model: Option<String>,

        /// Override the prompt assembly budget
        #[arg(long)]
        budget: Option<usize>,

        /// Override the iteration safety bound
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Skip the intent-clarification preprocessing call
        #[arg(long)]
        no_clarify: bool,
    },

    /// Pull the configured model onto the Ollama server
    Pull {
        /// Override the Ollama endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// Override the model name
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            message,
            endpoint,
            model,
            budget,
            max_iterations,
            no_clarify,
        } => {
            commands::run::run(
                cli.config.as_deref(),
                message,
                endpoint,
                model,
                budget,
                max_iterations,
                no_clarify,
            )
            .await?
        }
        Commands::Pull { endpoint, model } => {
            commands::pull::run(cli.config.as_deref(), endpoint, model).await?
        }
    }

    Ok(())
}
