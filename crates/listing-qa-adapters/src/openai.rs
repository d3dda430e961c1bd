//! OpenAI-compatible chat completions backend.
//!
//! Works with any service exposing `POST {base_url}/chat/completions` with
//! bearer authentication and JSON-object response mode (Groq, OpenAI,
//! local gateways).

use std::time::Duration;

use anyhow::{Context, Result};
use listing_qa_core::{BackendError, ReasoningBackend, ReasoningRequest};
use serde::Deserialize;
use tracing::debug;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Default request deadline in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest error body kept in a [`BackendError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Connection settings for the reasoning service.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Bearer token.
    pub api_key: String,
    /// Whole-request deadline.
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Settings for the default service with the given key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Extracts `choices[0].message.content` from a chat completions body.
///
/// # Errors
///
/// Returns [`BackendError::InvalidJson`] if the body is not a chat
/// completions response and [`BackendError::EmptyResponse`] if it carries no
/// content.
pub fn extract_content(body: &str) -> Result<String, BackendError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::InvalidJson(format!("unexpected response body: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(BackendError::EmptyResponse)
}

/// Blocking client for an OpenAI-compatible service.
pub struct OpenAiCompatibleClient {
    config: OpenAiConfig,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleClient {
    /// Creates a client whose every request is bounded by `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { config, client })
    }

    /// Returns the connection settings.
    #[must_use]
    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn map_send_error(&self, e: &reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.config.timeout_secs)
        } else {
            BackendError::Http(format!("request failed: {e}"))
        }
    }
}

impl ReasoningBackend for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn complete(&self, request: &ReasoningRequest) -> Result<String, BackendError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
            "response_format": {"type": "json_object"},
        });

        let url = self.config.endpoint();
        debug!("POST {} (model {})", url, self.config.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        let text = response.text().map_err(|e| self.map_send_error(&e))?;

        if !status.is_success() {
            let mut body = text.trim().to_string();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_content(&text)
    }
}
