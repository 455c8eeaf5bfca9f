//! Response bodies for the JSON endpoints

use serde::{Deserialize, Serialize};

use super::{Conversation, Document};

/// Which retrieval strategy produced an answer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Retrieved from one named document
    Document,
    /// Retrieved across every indexed document
    CrossDocument,
    /// No indexed documents; persona + history only
    Conversational,
}

/// POST /upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub document: Document,
    /// Why ingestion failed, when it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
}

/// POST /ask response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub success: bool,
    pub answer: String,
    pub mode: AnswerMode,
    pub conversation: Conversation,
}

/// GET /documents response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub success: bool,
    pub documents: Vec<Document>,
}

/// GET /conversations response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub success: bool,
    pub conversations: Vec<Conversation>,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// POST /compare_documents response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    pub success: bool,
    pub comparison: String,
    pub conversation: Conversation,
}

/// POST /export_conversation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    /// Markdown transcript
    pub export_text: String,
    /// Suggested download name
    pub filename: String,
}

/// Coarse relevance bucket derived from a distance score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    /// Bucket a distance (lower is more similar)
    pub fn from_distance(distance: f32) -> Self {
        if distance < 0.5 {
            Self::High
        } else if distance < 1.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// One semantic search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub document_id: i64,
    pub document_name: String,
    /// Chunk preview
    pub content: String,
    /// Distance between query and chunk embeddings (lower is better)
    pub similarity_score: f32,
    pub relevance: Relevance,
}

/// POST /search_documents response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_buckets() {
        assert_eq!(Relevance::from_distance(0.0), Relevance::High);
        assert_eq!(Relevance::from_distance(0.49), Relevance::High);
        assert_eq!(Relevance::from_distance(0.5), Relevance::Medium);
        assert_eq!(Relevance::from_distance(0.99), Relevance::Medium);
        assert_eq!(Relevance::from_distance(1.0), Relevance::Low);
        assert_eq!(Relevance::from_distance(3.2), Relevance::Low);
    }

    #[test]
    fn test_answer_mode_json() {
        assert_eq!(
            serde_json::to_string(&AnswerMode::CrossDocument).unwrap(),
            "\"cross_document\""
        );
    }
}
