//! GenerationBackend trait — the abstraction over text-generation services.
//!
//! A backend knows how to take an assembled prompt and return the model's
//! raw text response. The control loop calls `generate()` without knowing
//! which backend is in use.
//!
//! Implementations: Ollama HTTP endpoint, scripted test backend.

use async_trait::async_trait;

use crate::error::BackendError;

/// The core generation backend trait.
///
/// `generate` must be sequential from the caller's perspective: one prompt
/// in, one complete plain-text response out. Streaming, batching, and
/// transport timeouts are concerns of the implementation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "ollama", "scripted").
    fn name(&self) -> &str;

    /// Submit a prompt and return the complete response text.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, BackendError>;
}
