//! Generation backends for PromptWeave.
//!
//! A backend implements [`promptweave_core::GenerationBackend`]: it takes a
//! fully assembled prompt and returns the model's completion. The primary
//! backend targets a local [Ollama](https://ollama.com) server; the scripted
//! backend exists for tests.

pub mod ollama;
pub mod scripted;

pub use ollama::OllamaBackend;
pub use scripted::ScriptedBackend;
