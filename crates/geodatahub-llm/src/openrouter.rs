use async_trait::async_trait;
use geodatahub_core::Result;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

use crate::chat::ChatClient;
use crate::ports::CompletionBackend;

pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

const SITE_URL: &str = "https://github.com/geodatahub/geodatahub";
const APP_NAME: &str = "GeoDataHub";

/// OpenRouter gateway to hosted models, including free tiers
pub struct OpenRouterBackend {
    client: ChatClient,
}

impl OpenRouterBackend {
    pub fn new(api_key: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("HTTP-Referer", HeaderValue::from_static(SITE_URL));
        headers.insert("X-Title", HeaderValue::from_static(APP_NAME));

        let client = ChatClient::new("openrouter", OPENROUTER_ENDPOINT, api_key, model, timeout, headers)?;
        Ok(Self { client })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.client = self.client.with_endpoint(endpoint);
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterBackend {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.client.complete(prompt).await
    }
}
