//! GeoDataHub LLM - Completion backends for query parsing
//!
//! Hosted (Groq, OpenRouter) and local (Ollama) text completion behind the
//! `CompletionBackend` port, plus the environment-driven backend selection.

pub mod chat;
pub mod groq;
pub mod ollama;
pub mod openrouter;
pub mod ports;
pub mod select;
pub mod util;

mod transport;

pub use groq::GroqBackend;
pub use ollama::OllamaBackend;
pub use openrouter::OpenRouterBackend;
pub use ports::CompletionBackend;
pub use select::{complete, select_backend};
