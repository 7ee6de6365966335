//! Scripted backend for tests — returns canned responses in sequence.

use async_trait::async_trait;
use promptweave_core::{BackendError, GenerationBackend};
use std::sync::Mutex;

/// A backend that replays a fixed script of responses, one per call.
/// Panics when called past the end of the script. Test use only.
pub struct ScriptedBackend {
    responses: Mutex<Vec<Result<String, BackendError>>>,
    calls: Mutex<usize>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String, BackendError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Script of plain-text successes.
    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    /// A script of one successful response.
    pub fn single_text(text: &str) -> Self {
        Self::from_texts(&[text])
    }

    /// How many times `generate` has been called.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    /// Every prompt `generate` has been called with, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            let index = *calls;
            *calls += 1;
            index
        };
        self.prompts.lock().unwrap().push(prompt.to_string());

        let responses = self.responses.lock().unwrap();
        match responses.get(index) {
            Some(response) => response.clone(),
            None => panic!(
                "scripted backend exhausted: call {} but only {} responses scripted",
                index + 1,
                responses.len()
            ),
        }
    }
}
