//! Provider abstractions for embeddings and chat completions
//!
//! Trait-based so the server can talk to an OpenAI-compatible API or a local
//! Ollama server, and tests can run against in-process fakes.

pub mod embedding;
pub mod llm;
pub mod ollama;
pub mod openai;

#[cfg(test)]
pub mod fake;

use std::sync::Arc;

use crate::config::{LlmBackend, LlmConfig};
use crate::error::Result;

pub use embedding::EmbeddingProvider;
pub use llm::{ChatMessage, CompletionRequest, LlmProvider, Role};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Build the embedding and LLM providers for the configured backend.
///
/// Both roles share one client.
pub fn build_providers(
    config: &LlmConfig,
) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>)> {
    match config.backend {
        LlmBackend::OpenAi => {
            let client = Arc::new(OpenAiClient::new(config)?);
            let embedder: Arc<dyn EmbeddingProvider> = client.clone();
            let llm: Arc<dyn LlmProvider> = client;
            Ok((embedder, llm))
        }
        LlmBackend::Ollama => {
            let client = Arc::new(OllamaClient::new(config)?);
            let embedder: Arc<dyn EmbeddingProvider> = client.clone();
            let llm: Arc<dyn LlmProvider> = client;
            Ok((embedder, llm))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_providers_per_backend() {
        let config = LlmConfig {
            backend: LlmBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            ..LlmConfig::default()
        };
        let (embedder, llm) = build_providers(&config).unwrap();
        assert_eq!(embedder.name(), "ollama");
        assert_eq!(llm.name(), "ollama");

        let (embedder, llm) = build_providers(&LlmConfig::default()).unwrap();
        assert_eq!(embedder.name(), "openai");
        assert_eq!(llm.model(), "gpt-4o");
    }
}
