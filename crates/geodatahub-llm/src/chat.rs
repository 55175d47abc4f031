//! OpenAI-compatible chat completions client shared by Groq and OpenRouter

use geodatahub_core::error::{GeodatahubError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Client for one `/chat/completions` endpoint
pub struct ChatClient {
    backend: &'static str,
    endpoint: String,
    model: String,
    max_tokens: Option<u32>,
    http: reqwest::Client,
}

impl ChatClient {
    /// `extra_headers` are sent with every request next to the bearer token
    pub fn new(
        backend: &'static str,
        endpoint: impl Into<String>,
        api_key: &str,
        model: impl Into<String>,
        timeout: Duration,
        extra_headers: HeaderMap,
    ) -> Result<Self> {
        let mut headers = extra_headers;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            GeodatahubError::BackendUnavailable {
                backend: backend.to_string(),
                reason: "API key contains characters not allowed in a header".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            backend,
            endpoint: endpoint.into(),
            model: model.into(),
            max_tokens: None,
            http: transport::build_client(backend, timeout, headers)?,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one user message and return the first choice's text
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: 0.0,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(backend = self.backend, model = %self.model, "Chat completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport::send_error(self.backend, e))?;

        let response = transport::check_status(self.backend, response).await?;
        let chat: ChatResponse = transport::decode(self.backend, response).await?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GeodatahubError::BackendError {
                backend: self.backend.to_string(),
                reason: "Response contained no message content".to_string(),
            })
    }
}
