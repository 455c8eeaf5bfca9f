//! research-rag: document question-answering backend
//!
//! Uploaded PDF and text files are parsed, chunked and embedded into a
//! per-document in-memory index. Questions are answered against one document,
//! across all documents, or conversationally, and every exchange is recorded
//! in a browser session's history.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, Document, FileType},
    response::{AnswerMode, SearchHit},
    Conversation,
};
