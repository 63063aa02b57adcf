//! Text-generation capability

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable overriding the model
pub const MODEL_ENV: &str = "LECTERN_MODEL";

pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 256;

/// Failures the annotation engine distinguishes
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Generation timed out")]
    Timeout,

    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    #[error("Generation returned no text")]
    EmptyResponse,

    #[error("Generation failed: {0}")]
    Failed(String),
}

/// Text in, text or failure out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Generator backed by the Anthropic Messages API
pub struct AnthropicGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl AnthropicGenerator {
    /// Create a generator; a missing key makes every call an authentication failure
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Failed(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Read the key and model from the environment
    pub fn from_env(timeout: Duration) -> Result<Self, GenerationError> {
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(std::env::var(API_KEY_ENV).ok(), model, timeout)
    }

    /// Send requests to a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::Authentication(format!("{} is not set", API_KEY_ENV)))?;

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Generation request rejected");
            return Err(classify_status(status, &body));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Failed(format!("malformed response: {}", e)))?;

        let text = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();

        if text.is_empty() {
            Err(GenerationError::EmptyResponse)
        } else {
            Ok(text.to_string())
        }
    }
}

fn classify_transport_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Timeout
    } else if error.is_connect() {
        GenerationError::Unavailable(error.to_string())
    } else {
        GenerationError::Failed(error.to_string())
    }
}

/// Map a non-success status to a generation error
fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    let detail = format!("{}: {}", status, crate::text::char_prefix(body.trim(), 200));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Authentication(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GenerationError::Timeout,
        StatusCode::TOO_MANY_REQUESTS => GenerationError::Unavailable(detail),
        s if s.is_server_error() => GenerationError::Unavailable(detail),
        _ => GenerationError::Failed(detail),
    }
}
