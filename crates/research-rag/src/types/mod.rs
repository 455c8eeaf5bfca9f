//! Core types for the research assistant

pub mod conversation;
pub mod document;
pub mod query;
pub mod response;

pub use conversation::{recent_turns, Conversation, NewConversation, Turn};
pub use document::{truncate_chars, Chunk, Document, FileType, NewDocument};
pub use query::{AskRequest, CompareRequest, ComparisonMode, SearchRequest};
pub use response::{AnswerMode, Relevance, SearchHit};
