//! `promptweave run` — one-shot or interactive agent session.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use promptweave_agent::ControlLoop;
use promptweave_backends::OllamaBackend;
use promptweave_capabilities::default_registry;
use promptweave_config::AgentConfig;
use promptweave_core::ConversationLog;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    config_path: Option<&Path>,
    message: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    budget: Option<usize>,
    max_iterations: Option<u32>,
    no_clarify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AgentConfig::load(config_path)?;
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(budget) = budget {
        config.budget = budget;
    }
    if let Some(max_iterations) = max_iterations {
        config.max_iterations = max_iterations;
    }
    if no_clarify {
        config.clarify_intent = false;
    }
    config.validate()?;
    tracing::debug!(
        endpoint = %config.endpoint,
        model = %config.model,
        budget = config.budget,
        "configuration resolved"
    );

    let backend = Arc::new(OllamaBackend::new(&config.endpoint, &config.model));
    let registry = Arc::new(default_registry());
    let agent = ControlLoop::new(backend, registry)
        .with_budget(config.budget)
        .with_max_iterations(config.max_iterations)
        .with_clarify_intent(config.clarify_intent);

    let mut log = ConversationLog::new();

    if let Some(message) = message {
        let outcome = agent.run(&mut log, &message).await?;
        println!("{}", outcome.answer);
        return Ok(());
    }

    // Interactive mode: one shared log across turns, so later runs see
    // earlier conversation.
    println!("PromptWeave agent — model '{}' at {}", config.model, config.endpoint);
    println!("Type your message and press Enter. 'exit' or 'quit' to leave.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        match agent.run(&mut log, line).await {
            Ok(outcome) => println!("{}\n", outcome.answer),
            Err(e) => eprintln!("error: {e}\n"),
        }
    }

    Ok(())
}
