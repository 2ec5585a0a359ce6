//! OpenAI-compatible chat-completions client.
//!
//! One user message per prompt, no streaming. Transient failures (connection
//! errors, HTTP 429, HTTP 5xx) are retried up to `max_retries` times with a
//! fixed back-off; anything else fails the call immediately.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use orient_core::config::GenerationConfig;
use orient_core::traits::TextGenerator;
use orient_core::types::Completion;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    ResponseParse(String),
}

impl GenerationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Server { .. } | Self::Transport(_))
    }
}

pub struct OpenAiChatGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl OpenAiChatGenerator {
    /// Build a client from configuration. Local endpoints (localhost,
    /// 127.0.0.1) do not require an API key.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let is_local = config.base_url.contains("localhost") || config.base_url.contains("127.0.0.1");
        let api_key = match config.resolve_api_key() {
            Some(key) => key,
            None if is_local => {
                debug!("No API key set for local provider; using dummy bearer token");
                "local".to_string()
            }
            None => {
                return Err(GenerationError::AuthFailed(format!(
                    "no generation.api_key and env var '{}' not set",
                    config.api_key_env
                )))
            }
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    pub fn request_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
        });
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    fn complete_once(&self, prompt: &str) -> Result<Completion, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, prompt_chars = prompt.chars().count(), "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| GenerationError::Transport(format!("failed to read response body: {e}")))?;
        if !status.is_success() {
            return Err(map_http_error(status, body));
        }
        let json: Value = serde_json::from_str(&body).map_err(|e| GenerationError::ResponseParse(format!("invalid JSON: {e}")))?;
        parse_response(&json)
    }
}

impl TextGenerator for OpenAiChatGenerator {
    fn generate(&self, prompt: &str) -> anyhow::Result<Completion> {
        let mut attempt = 0;
        loop {
            match self.complete_once(prompt) {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, max_retries = self.max_retries, "transient generation failure, retrying");
                    thread::sleep(self.retry_backoff);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Extract the first choice's text. A `null` or missing `content` is an empty
/// completion, not an error.
pub fn parse_response(body: &Value) -> Result<Completion, GenerationError> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| GenerationError::ResponseParse("no choices in response".to_string()))?;
    Ok(match message.get("content").and_then(Value::as_str) {
        Some(text) => Completion::text(text),
        None => Completion::empty(),
    })
}

pub fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    match status.as_u16() {
        401 | 403 => GenerationError::AuthFailed(body),
        429 => GenerationError::RateLimited(body),
        code if code >= 500 => GenerationError::Server { status: code, body },
        code => GenerationError::Api { status: code, body },
    }
}
