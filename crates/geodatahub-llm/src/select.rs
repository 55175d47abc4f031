use geodatahub_core::config::{LayeredConfig, LlmBackendKind, LlmCredentials};
use geodatahub_core::error::{GeodatahubError, Result};
use std::sync::Arc;

use crate::groq::GroqBackend;
use crate::ollama::OllamaBackend;
use crate::openrouter::OpenRouterBackend;
use crate::ports::CompletionBackend;

/// Pick the completion backend for `selector`
///
/// An explicit backend that cannot be used fails with `BackendUnavailable`.
/// `Auto` tries Groq (API key set), then Ollama (server answers), then
/// OpenRouter (API key set), and yields `None` when none qualifies.
/// `Regex` always yields `None`.
pub async fn select_backend(
    config: &LayeredConfig,
    credentials: &LlmCredentials,
    selector: LlmBackendKind,
) -> Result<Option<Arc<dyn CompletionBackend>>> {
    match selector {
        LlmBackendKind::Regex => Ok(None),
        LlmBackendKind::Groq => groq(config, credentials).map(Some),
        LlmBackendKind::Ollama => ollama(config).await.map(Some),
        LlmBackendKind::OpenRouter => openrouter(config, credentials).map(Some),
        LlmBackendKind::Auto => {
            if credentials.groq_api_key.is_some() {
                match groq(config, credentials) {
                    Ok(backend) => return Ok(Some(backend)),
                    Err(e) => tracing::warn!("Skipping Groq: {}", e),
                }
            }

            match ollama(config).await {
                Ok(backend) => return Ok(Some(backend)),
                Err(e) => tracing::debug!("Skipping Ollama: {}", e),
            }

            if credentials.openrouter_api_key.is_some() {
                match openrouter(config, credentials) {
                    Ok(backend) => return Ok(Some(backend)),
                    Err(e) => tracing::warn!("Skipping OpenRouter: {}", e),
                }
            }

            tracing::info!("No LLM backend available, using regex parsing");
            Ok(None)
        }
    }
}

/// Select a backend and complete `prompt` with it
pub async fn complete(
    config: &LayeredConfig,
    credentials: &LlmCredentials,
    selector: LlmBackendKind,
    prompt: &str,
) -> Result<String> {
    let backend = select_backend(config, credentials, selector)
        .await?
        .ok_or_else(|| GeodatahubError::BackendUnavailable {
            backend: selector.to_string(),
            reason: "no LLM backend is available".to_string(),
        })?;

    backend.complete(prompt).await
}

fn groq(config: &LayeredConfig, credentials: &LlmCredentials) -> Result<Arc<dyn CompletionBackend>> {
    let key = credentials
        .groq_api_key
        .as_deref()
        .ok_or_else(|| GeodatahubError::BackendUnavailable {
            backend: "groq".to_string(),
            reason: "GROQ_API_KEY is not set".to_string(),
        })?;
    let backend = GroqBackend::new(key, config.groq_model.value.clone(), config.llm_timeout())?;
    tracing::info!(model = %backend.model(), "Using Groq for query parsing");
    Ok(Arc::new(backend))
}

async fn ollama(config: &LayeredConfig) -> Result<Arc<dyn CompletionBackend>> {
    let backend = OllamaBackend::new(
        config.ollama_url.value.clone(),
        config.ollama_model.value.clone(),
        config.llm_timeout(),
    )?;

    if !backend.is_available().await {
        return Err(GeodatahubError::BackendUnavailable {
            backend: "ollama".to_string(),
            reason: format!("no Ollama server answering at {}", backend.base_url()),
        });
    }

    tracing::info!(model = %backend.model(), "Using Ollama for query parsing");
    Ok(Arc::new(backend))
}

fn openrouter(
    config: &LayeredConfig,
    credentials: &LlmCredentials,
) -> Result<Arc<dyn CompletionBackend>> {
    let key = credentials
        .openrouter_api_key
        .as_deref()
        .ok_or_else(|| GeodatahubError::BackendUnavailable {
            backend: "openrouter".to_string(),
            reason: "OPENROUTER_API_KEY is not set".to_string(),
        })?;
    let backend = OpenRouterBackend::new(key, config.openrouter_model.value.clone(), config.llm_timeout())?;
    tracing::info!(model = %backend.model(), "Using OpenRouter for query parsing");
    Ok(Arc::new(backend))
}
