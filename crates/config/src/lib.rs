//! Configuration loading and validation for PromptWeave.
//!
//! Loads configuration from a TOML file with environment variable overrides
//! (`PROMPTWEAVE_*`). Every field has a default, so a missing config file is
//! not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Agent runtime configuration.
///
/// Maps directly to the TOML config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name to generate with.
    #[serde(default = "default_model")]
    pub model: String,

    /// Prompt assembly budget, in oracle length units.
    #[serde(default = "default_budget")]
    pub budget: usize,

    /// Safety bound on control-loop iterations per run.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Whether to run the intent-clarification preprocessing call.
    #[serde(default = "default_true")]
    pub clarify_intent: bool,
}

fn default_endpoint() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "zephyr".into()
}
fn default_budget() -> usize {
    4000
}
fn default_max_iterations() -> u32 {
    25
}
fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            budget: default_budget(),
            max_iterations: default_max_iterations(),
            clarify_intent: true,
        }
    }
}

impl AgentConfig {
    /// Load configuration. Reads `path` when given (missing file = defaults),
    /// then applies `PROMPTWEAVE_*` environment overrides, then validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(endpoint) = std::env::var("PROMPTWEAVE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("PROMPTWEAVE_MODEL") {
            self.model = model;
        }
        if let Ok(budget) = std::env::var("PROMPTWEAVE_BUDGET") {
            self.budget = budget.parse().map_err(|_| {
                ConfigError::Invalid(format!("PROMPTWEAVE_BUDGET is not a number: '{budget}'"))
            })?;
        }
        if let Ok(max) = std::env::var("PROMPTWEAVE_MAX_ITERATIONS") {
            self.max_iterations = max.parse().map_err(|_| {
                ConfigError::Invalid(format!("PROMPTWEAVE_MAX_ITERATIONS is not a number: '{max}'"))
            })?;
        }
        if let Ok(clarify) = std::env::var("PROMPTWEAVE_CLARIFY_INTENT") {
            self.clarify_intent = matches!(clarify.as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if self.budget == 0 {
            return Err(ConfigError::Invalid("budget must be greater than 0".into()));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_iterations must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse config file at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
