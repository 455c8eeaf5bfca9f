//! Flat in-memory vector index over one document's chunks

use crate::error::{Error, Result};
use crate::types::Chunk;

/// A chunk returned from a similarity search
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Squared Euclidean distance to the query (lower is more similar)
    pub distance: f32,
}

/// Brute-force index of chunk embeddings for a single document
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    document_id: i64,
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    dimensions: usize,
}

impl DocumentIndex {
    /// Build an index from chunks and their embeddings (same order)
    pub fn build(document_id: i64, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::internal("Cannot build an index without chunks"));
        }
        if chunks.len() != embeddings.len() {
            return Err(Error::embedding(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimensions = embeddings[0].len();
        if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(Error::embedding("Embeddings have inconsistent dimensions"));
        }

        Ok(Self {
            document_id,
            chunks,
            embeddings,
            dimensions,
        })
    }

    pub fn document_id(&self) -> i64 {
        self.document_id
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The `top_k` nearest chunks, ascending by distance.
    ///
    /// Ties keep chunk order. A query of the wrong dimension is an error.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "Query has {} dimensions, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, emb)| (i, squared_l2(query, emb)))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| ScoredChunk {
                chunk: self.chunks[i].clone(),
                distance,
            })
            .collect())
    }
}

/// Squared Euclidean distance
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
