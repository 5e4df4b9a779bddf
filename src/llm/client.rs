// src/llm/client.rs
// OpenAI-compatible chat completion client with a bounded wait

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{ChatTurn, CompletionRequest};
use crate::config::ChatConfig;

/// Longest slice of an upstream error body kept for logs.
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream call timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Transport(reqwest::Error),

    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Upstream response had no choices")]
    EmptyChoice,
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Transport(e)
        }
    }
}

/// The one network dependency of a chat turn. Returns the raw completion text;
/// an empty string is a valid (if useless) completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError>;

    fn model(&self) -> &str;
}

#[derive(Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: Option<WireMessage>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
}

impl OpenAiCompatClient {
    pub fn new(config: &ChatConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.upstream_timeout())
            .build()
            .map_err(UpstreamError::Transport)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            url: config.completions_url(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        let body = WireRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
            presence_penalty: request.sampling.presence_penalty,
            frequency_penalty: request.sampling.frequency_penalty,
        };

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            temperature = request.sampling.temperature,
            "Calling upstream"
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_PREVIEW).collect(),
            });
        }

        let parsed: WireResponse = serde_json::from_str(&text)?;
        let first = parsed.choices.into_iter().next().ok_or(UpstreamError::EmptyChoice)?;

        Ok(first
            .message
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
