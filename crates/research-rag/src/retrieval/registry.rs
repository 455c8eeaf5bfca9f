//! Process-wide map from document id to its in-memory index

use dashmap::DashMap;
use std::sync::Arc;

use super::index::DocumentIndex;

/// An index together with the full text it was built from
#[derive(Debug)]
pub struct IndexedDocument {
    pub index: DocumentIndex,
    /// Full extracted text
    pub text: String,
}

/// Registry of per-document indices.
///
/// Entries exist only for documents whose ingestion succeeded and are lost on
/// restart. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct IndexRegistry {
    entries: Arc<DashMap<i64, Arc<IndexedDocument>>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a document's index
    pub fn insert(&self, index: DocumentIndex, text: String) {
        let id = index.document_id();
        self.entries.insert(id, Arc::new(IndexedDocument { index, text }));
    }

    pub fn get(&self, document_id: i64) -> Option<Arc<IndexedDocument>> {
        self.entries.get(&document_id).map(|e| Arc::clone(e.value()))
    }

    /// Full text of an indexed document
    pub fn text(&self, document_id: i64) -> Option<String> {
        self.entries.get(&document_id).map(|e| e.text.clone())
    }

    pub fn remove(&self, document_id: i64) -> bool {
        self.entries.remove(&document_id).is_some()
    }

    pub fn contains(&self, document_id: i64) -> bool {
        self.entries.contains_key(&document_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, ascending by document id
    pub fn snapshot(&self) -> Vec<Arc<IndexedDocument>> {
        let mut all: Vec<_> = self.entries.iter().map(|e| Arc::clone(e.value())).collect();
        all.sort_by_key(|d| d.index.document_id());
        all
    }
}
