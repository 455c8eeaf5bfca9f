//! Configuration for the research assistant
//!
//! Values come from `RagConfig::default()`, optionally overlaid by a TOML file
//! and then by `RAG_*` / `OPENAI_API_KEY` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database and upload locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding / LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Document summary generation
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Retrieval and answer limits
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Overlay environment variables on top of the current values
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(backend) = lookup("RAG_LLM_BACKEND") {
            self.llm.backend = match backend.to_lowercase().as_str() {
                "openai" => LlmBackend::OpenAi,
                "ollama" => LlmBackend::Ollama,
                other => {
                    return Err(Error::Config(format!("Unknown LLM backend: {}", other)));
                }
            };
        }
        if let Some(url) = lookup("RAG_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(host) = lookup("RAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RAG_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid RAG_PORT: {}", port)))?;
        }
        if let Some(path) = lookup("RAG_DATABASE_PATH") {
            self.storage.database_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("RAG_UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.llm.max_embed_batch == 0 {
            return Err(Error::Config("max_embed_batch must be positive".to_string()));
        }
        if self.llm.backend == LlmBackend::OpenAi
            && self.llm.api_key.as_deref().map_or(true, str::is_empty)
        {
            return Err(Error::Config(
                "OPENAI_API_KEY environment variable is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable permissive CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 16MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            max_upload_size: 16 * 1024 * 1024,
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Directory for uploaded files
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let root = dirs::data_local_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join("research-rag");

        Self {
            database_path: root.join("research.db"),
            upload_dir: root.join("uploads"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Which provider API to talk to
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// OpenAI or any OpenAI-compatible endpoint
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Embedding / LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider API flavour
    #[serde(default)]
    pub backend: LlmBackend,
    /// Base URL (e.g. https://api.openai.com/v1 or http://localhost:11434)
    pub base_url: String,
    /// API key (OpenAI backend only)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Chat completion model
    pub chat_model: String,
    /// Embedding model
    pub embed_model: String,
    /// Temperature for answers and comparisons
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Most inputs sent in one embeddings request
    #[serde(default = "default_max_embed_batch")]
    pub max_embed_batch: usize,
}

fn default_max_embed_batch() -> usize {
    500
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            chat_model: "gpt-4o".to_string(),
            embed_model: "text-embedding-ada-002".to_string(),
            temperature: 0.7,
            timeout_secs: 120,
            max_embed_batch: default_max_embed_batch(),
        }
    }
}

/// Summary generation during ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Characters of document text sent to the model
    pub input_chars: usize,
    /// Output token cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            input_chars: 3000,
            max_tokens: 150,
            temperature: 0.3,
        }
    }
}

/// Retrieval and answer limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved for a document-scoped question
    pub document_top_k: usize,
    /// Prior turns replayed for a document-scoped question
    pub document_history: usize,
    /// Chunks retrieved per document for a cross-document question
    pub cross_document_top_k: usize,
    /// Total chunks kept for a cross-document question
    pub max_context_chunks: usize,
    /// Prior turns replayed for a cross-document question
    pub cross_document_history: usize,
    /// Prior turns replayed when no documents are indexed
    pub conversation_history: usize,
    /// Conversations loaded from the store per question
    pub history_window: usize,
    /// Output token cap for answers
    pub answer_max_tokens: u32,
    /// Output token cap for comparisons
    pub comparison_max_tokens: u32,
    /// Raw text characters per document in a comparison prompt
    pub comparison_chars: usize,
    /// Hits per document index for semantic search
    pub search_top_k: usize,
    /// Maximum semantic search results returned
    pub max_search_results: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            document_top_k: 3,
            document_history: 5,
            cross_document_top_k: 2,
            max_context_chunks: 5,
            cross_document_history: 3,
            conversation_history: 5,
            history_window: 10,
            answer_max_tokens: 500,
            comparison_max_tokens: 1000,
            comparison_chars: 2000,
            search_top_k: 3,
            max_search_results: 10,
        }
    }
}
