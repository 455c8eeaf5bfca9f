//! Application state for the research assistant server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::{DocumentComparator, QueryOrchestrator};
use crate::ingestion::IngestPipeline;
use crate::providers::{build_providers, EmbeddingProvider, LlmProvider};
use crate::retrieval::{IndexRegistry, SemanticSearch};
use crate::storage::{Database, UploadStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Documents and conversations
    db: Database,
    /// Uploaded originals
    uploads: UploadStore,
    /// Embedding provider (OpenAI-compatible or Ollama)
    embedding_provider: Arc<dyn EmbeddingProvider>,
    /// LLM provider (OpenAI-compatible or Ollama)
    llm_provider: Arc<dyn LlmProvider>,
    /// Per-document indices, shared with everything below
    registry: IndexRegistry,
    pipeline: IngestPipeline,
    orchestrator: QueryOrchestrator,
    comparator: DocumentComparator,
    search: SemanticSearch,
}

impl AppState {
    /// Create new application state from configuration
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing research assistant state (backend: {:?})...",
            config.llm.backend
        );

        let db = Database::new(&config.storage.database_path)?;
        tracing::info!("Database opened at {}", config.storage.database_path.display());

        let uploads = UploadStore::new(&config.storage.upload_dir)?;
        tracing::info!("Upload directory: {}", config.storage.upload_dir.display());

        let (embedding_provider, llm_provider) = build_providers(&config.llm)?;
        tracing::info!(
            "Providers ready: {} (chat: {}, embeddings: {})",
            llm_provider.name(),
            config.llm.chat_model,
            config.llm.embed_model
        );

        Ok(Self::from_parts(config, db, uploads, embedding_provider, llm_provider))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: RagConfig,
        db: Database,
        uploads: UploadStore,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        llm_provider: Arc<dyn LlmProvider>,
    ) -> Self {
        let registry = IndexRegistry::new();

        let pipeline = IngestPipeline::new(
            &config.chunking,
            config.summary.clone(),
            Arc::clone(&embedding_provider),
            Arc::clone(&llm_provider),
            registry.clone(),
        );
        let orchestrator = QueryOrchestrator::new(
            Arc::clone(&embedding_provider),
            Arc::clone(&llm_provider),
            registry.clone(),
            config.retrieval.clone(),
        );
        let comparator =
            DocumentComparator::new(Arc::clone(&llm_provider), registry.clone(), &config.retrieval);
        let search = SemanticSearch::new(
            Arc::clone(&embedding_provider),
            registry.clone(),
            db.clone(),
            &config.retrieval,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                uploads,
                embedding_provider,
                llm_provider,
                registry,
                pipeline,
                orchestrator,
                comparator,
                search,
            }),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.inner.registry
    }

    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    pub fn orchestrator(&self) -> &QueryOrchestrator {
        &self.inner.orchestrator
    }

    pub fn comparator(&self) -> &DocumentComparator {
        &self.inner.comparator
    }

    pub fn search(&self) -> &SemanticSearch {
        &self.inner.search
    }

    /// Whether the configured provider answers its health endpoint
    pub async fn providers_healthy(&self) -> bool {
        let llm = self.inner.llm_provider.health_check().await.unwrap_or(false);
        let embedder = self
            .inner
            .embedding_provider
            .health_check()
            .await
            .unwrap_or(false);
        llm && embedder
    }
}
