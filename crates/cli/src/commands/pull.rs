//! `promptweave pull` — pull the configured model onto the Ollama server.

use std::path::Path;

use promptweave_backends::OllamaBackend;
use promptweave_config::AgentConfig;

pub async fn run(
    config_path: Option<&Path>,
    endpoint: Option<String>,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AgentConfig::load(config_path)?;
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if let Some(model) = model {
        config.model = model;
    }
    config.validate()?;

    println!("Pulling '{}' from {} ...", config.model, config.endpoint);
    let backend = OllamaBackend::new(&config.endpoint, &config.model);
    backend.pull_model().await?;
    println!("Model '{}' is ready.", config.model);
    Ok(())
}
