use async_trait::async_trait;
use geodatahub_core::Result;
use reqwest::header::HeaderMap;
use std::time::Duration;

use crate::chat::ChatClient;
use crate::ports::CompletionBackend;

pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq hosted inference (OpenAI-compatible)
pub struct GroqBackend {
    client: ChatClient,
}

impl GroqBackend {
    pub fn new(api_key: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = ChatClient::new("groq", GROQ_ENDPOINT, api_key, model, timeout, HeaderMap::new())?
            .with_max_tokens(500);
        Ok(Self { client })
    }

    /// Point at another chat completions URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.client = self.client.with_endpoint(endpoint);
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl CompletionBackend for GroqBackend {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.client.complete(prompt).await
    }
}
