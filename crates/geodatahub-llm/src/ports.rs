use async_trait::async_trait;
use geodatahub_core::Result;

/// Trait for text completion backends
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short backend name used in logs and errors (e.g., "groq")
    fn name(&self) -> &str;

    /// Complete a single-turn prompt at temperature 0
    ///
    /// Unreachable backends, timeouts and rejected credentials fail with
    /// `BackendUnavailable`; bad statuses and undecodable replies with
    /// `BackendError`.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
