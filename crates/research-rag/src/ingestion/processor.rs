//! Ingestion pipeline orchestration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ChunkingConfig, SummaryConfig};
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::{CompletionRequest, EmbeddingProvider, LlmProvider};
use crate::retrieval::{DocumentIndex, IndexRegistry};

use super::chunker::TextChunker;
use super::parser::{FileParser, ParsedDocument};

/// Summary stored when the summary call fails
pub const SUMMARY_FAILED: &str = "Summary generation failed";

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub summary: String,
    pub chunk_count: usize,
    pub total_pages: Option<u32>,
}

/// Load, chunk, embed, index and summarise uploaded documents
pub struct IngestPipeline {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    registry: IndexRegistry,
    summary: SummaryConfig,
}

impl IngestPipeline {
    pub fn new(
        chunking: &ChunkingConfig,
        summary: SummaryConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        registry: IndexRegistry,
    ) -> Self {
        Self {
            chunker: TextChunker::new(chunking.chunk_size, chunking.chunk_overlap),
            embedder,
            llm,
            registry,
            summary,
        }
    }

    /// Indices built by this pipeline
    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    /// Run the full pipeline for a stored file.
    ///
    /// On success the document's index is registered; on failure nothing is.
    pub async fn process_document(&self, path: &Path, document_id: i64) -> Result<IngestOutcome> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let parsed = parse_blocking(path.to_path_buf()).await?;

        let chunks = self.chunker.split(document_id, &parsed.content);
        if chunks.is_empty() {
            return Err(Error::file_parse(filename, "No text content found in document"));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        let index = DocumentIndex::build(document_id, chunks, embeddings)?;
        let chunk_count = index.len();

        self.registry.insert(index, parsed.content.clone());
        tracing::info!(
            "Indexed document {} ({} chunks, {} chars) with {}",
            document_id,
            chunk_count,
            parsed.content.chars().count(),
            self.embedder.name()
        );

        let summary = self.summarize(&parsed.content).await;

        Ok(IngestOutcome {
            summary,
            chunk_count,
            total_pages: parsed.total_pages,
        })
    }

    /// Drop a document's index
    pub fn forget(&self, document_id: i64) -> bool {
        self.registry.remove(document_id)
    }

    /// One short LLM summary; failures degrade to a placeholder
    async fn summarize(&self, text: &str) -> String {
        let request = CompletionRequest::prompt(PromptBuilder::summary(text, self.summary.input_chars))
            .with_max_tokens(self.summary.max_tokens)
            .with_temperature(self.summary.temperature);

        match self.llm.complete(&request).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                tracing::warn!("Summary generation failed: {}", e);
                SUMMARY_FAILED.to_string()
            }
        }
    }
}

async fn parse_blocking(path: PathBuf) -> Result<ParsedDocument> {
    tokio::task::spawn_blocking(move || FileParser::parse_path(&path))
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
}
