//! Ollama backend — raw text completion against a local Ollama server.
//!
//! Talks to `POST {endpoint}/api/generate` with `raw: true` so the prompt
//! reaches the model verbatim, with no chat templating applied server-side.
//! Streaming is disabled; one request yields one complete response.

use async_trait::async_trait;
use promptweave_core::{BackendError, GenerationBackend};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Request timeout. Local models on modest hardware can take a while to
/// produce a full completion.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Body returned by some reverse proxies when an upstream times out. The
/// request itself is fine to re-issue, so we retry exactly once.
const RETRYABLE_BODY: &str = "error code: 524";

pub struct OllamaBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    #[allow(dead_code)]
    done: bool,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
}

impl OllamaBackend {
    /// Create a backend for `model` served at `endpoint`
    /// (e.g., `http://localhost:11434`).
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        }
    }

    async fn issue(&self, prompt: &str) -> Result<ResponseBody, BackendError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            raw: true,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(BackendError::Api {
                status_code: status.as_u16(),
                message: truncate_body(&body),
            });
        }
        Ok(ResponseBody(body))
    }

    /// Ask the server to pull `model` so the first generation call does not
    /// pay the download cost.
    pub async fn pull_model(&self) -> Result<(), BackendError> {
        let request = PullRequest {
            name: &self.model,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/pull", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status_code: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        let parsed: PullResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
        if parsed.status != "success" {
            return Err(BackendError::Api {
                status_code: status.as_u16(),
                message: format!("pull did not complete: status '{}'", parsed.status),
            });
        }
        Ok(())
    }
}

struct ResponseBody(String);

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let mut retried = false;
        loop {
            let ResponseBody(body) = self.issue(prompt).await?;

            if should_retry(&body, retried) {
                warn!("upstream timeout body received, re-issuing request once");
                retried = true;
                continue;
            }

            let parsed: GenerateResponse = serde_json::from_str(&body)
                .map_err(|_| BackendError::MalformedResponse(truncate_body(&body)))?;
            debug!(
                model = %self.model,
                response_len = parsed.response.len(),
                "generation complete"
            );
            return Ok(parsed.response);
        }
    }
}

/// One immediate re-issue is allowed for the recognized proxy timeout body.
fn should_retry(body: &str, already_retried: bool) -> bool {
    body.trim() == RETRYABLE_BODY && !already_retried
}

fn map_transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout(e.to_string())
    } else {
        BackendError::Network(e.to_string())
    }
}

/// Keep error messages short enough to log.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut cut = MAX;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &body[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trailing_slash_is_stripped() {
        let backend = OllamaBackend::new("http://localhost:11434/", "zephyr");
        assert_eq!(backend.endpoint, "http://localhost:11434");
    }

    #[test]
    fn generate_request_wire_shape() {
        let request = GenerateRequest {
            model: "zephyr",
            prompt: "Human: hi\nAI:",
            raw: true,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "zephyr");
        assert_eq!(json["raw"], true);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn generate_response_tolerates_missing_done() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"response":"ok"}"#).unwrap();
        assert_eq!(parsed.response, "ok");
        assert!(!parsed.done);
    }

    #[test]
    fn proxy_timeout_body_retries_exactly_once() {
        assert!(should_retry("error code: 524", false));
        assert!(should_retry("  error code: 524\n", false));
        // Second occurrence is surfaced as a malformed response instead.
        assert!(!should_retry("error code: 524", true));
        assert!(!should_retry("error code: 502", false));
        assert!(!should_retry(r#"{"response":"ok"}"#, false));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);
        let msg = truncate_body(&body);
        assert!(msg.len() < 250);
        assert!(msg.ends_with('…'));
    }
}
