//! Chat-completion API client.
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` wire format with
//! bearer-token auth. The key and model id come from the in-memory settings;
//! nothing is read from disk or the environment.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const TIMEOUT_SECS: u64 = 30;

/// Errors from talking to the chat API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status, with the provider's message when the body had one.
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx with a body that is not the expected shape.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    /// 2xx but no choices in the body.
    #[error("empty response from API")]
    EmptyResponse,
}

/// Outbound request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// One chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// A configured chat-completion client.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a request body for this client's model.
    pub fn chat_request(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            temperature,
        }
    }

    /// Send a request and return the first choice's content.
    pub async fn send(&self, request: &ChatRequest) -> Result<String, ApiError> {
        let response = self
            .http
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: provider_message(&body),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or(ApiError::EmptyResponse)
    }
}

/// Pull the provider's `error.message` out of a failure body, falling back
/// to the raw body when it isn't the expected JSON shape.
fn provider_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: Some(detail),
        }) => detail.message,
        _ if body.trim().is_empty() => "unknown error".to_string(),
        _ => body.trim().to_string(),
    }
}
