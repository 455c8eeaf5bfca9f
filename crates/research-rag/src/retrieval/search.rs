//! Semantic search across every indexed document

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::storage::Database;
use crate::types::{Relevance, SearchHit};

use super::registry::IndexRegistry;

/// Characters of chunk text returned per hit
const PREVIEW_CHARS: usize = 300;

/// Query embedding once, top-k per document, merged by distance
pub struct SemanticSearch {
    embedder: Arc<dyn EmbeddingProvider>,
    registry: IndexRegistry,
    db: Database,
    per_document: usize,
    max_results: usize,
}

impl SemanticSearch {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        registry: IndexRegistry,
        db: Database,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            registry,
            db,
            per_document: config.search_top_k,
            max_results: config.max_search_results,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::validation("Search query cannot be empty"));
        }

        let indexed = self.registry.snapshot();
        if indexed.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query).await?;

        let ids: Vec<i64> = indexed.iter().map(|d| d.index.document_id()).collect();
        let names: HashMap<i64, String> = self
            .db
            .get_documents(&ids)?
            .into_iter()
            .map(|d| (d.id, d.original_filename))
            .collect();

        let mut hits = Vec::new();
        for doc in &indexed {
            let document_id = doc.index.document_id();
            // Row deleted while the index lingered
            let Some(name) = names.get(&document_id) else {
                tracing::debug!("Skipping index for missing document {}", document_id);
                continue;
            };

            for scored in doc.index.search(&embedding, self.per_document)? {
                hits.push(SearchHit {
                    document_id,
                    document_name: name.clone(),
                    content: scored.chunk.preview(PREVIEW_CHARS),
                    similarity_score: scored.distance,
                    relevance: Relevance::from_distance(scored.distance),
                });
            }
        }

        hits.sort_by(|a, b| {
            a.similarity_score
                .partial_cmp(&b.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.max_results);

        tracing::info!(
            "Search '{}' matched {} chunks across {} documents",
            query,
            hits.len(),
            indexed.len()
        );
        Ok(hits)
    }
}
