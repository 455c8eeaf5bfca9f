//! In-memory vector retrieval

mod index;
mod registry;
mod search;

pub use index::{squared_l2, DocumentIndex, ScoredChunk};
pub use registry::{IndexRegistry, IndexedDocument};
pub use search::SemanticSearch;
