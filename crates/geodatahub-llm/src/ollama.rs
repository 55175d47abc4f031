use async_trait::async_trait;
use geodatahub_core::config::DEFAULT_OLLAMA_URL;
use geodatahub_core::Result;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::CompletionBackend;
use crate::transport;

/// Timeout for the availability probe against `/api/tags`
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Local Ollama server
pub struct OllamaBackend {
    /// Base URL for Ollama API (e.g., "http://localhost:11434")
    base_url: String,

    /// Model name to generate with
    model: String,

    http: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            http: transport::build_client("ollama", timeout, HeaderMap::new())?,
        })
    }

    /// Create with default localhost URL
    pub fn localhost(model: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::new(DEFAULT_OLLAMA_URL, model, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the server answers `/api/tags` within [`PROBE_TIMEOUT`]
    pub async fn is_available(&self) -> bool {
        let result = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %self.base_url, error = %e, "Ollama probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };

        tracing::debug!(model = %self.model, "Ollama generate request");

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport::send_error("ollama", e))?;

        let response = transport::check_status("ollama", response).await?;
        let generated: GenerateResponse = transport::decode("ollama", response).await?;

        Ok(generated.response)
    }
}

/// Request body for Ollama generate API
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response from Ollama generate API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_backend_creation() {
        let backend = OllamaBackend::localhost("llama3", Duration::from_secs(30)).unwrap();
        assert_eq!(backend.name(), "ollama");
        assert_eq!(backend.model(), "llama3");
        assert_eq!(backend.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_ollama_backend_custom_url() {
        let backend = OllamaBackend::new("http://gpu-box:11434/", "mistral", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://gpu-box:11434");
        assert_eq!(backend.model(), "mistral");
    }

    #[test]
    fn test_generate_request_disables_streaming() {
        let request = GenerateRequest {
            model: "llama3",
            prompt: "hi",
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["temperature"], 0.0);
    }
}
