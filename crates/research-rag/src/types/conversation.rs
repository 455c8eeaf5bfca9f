//! Conversation history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored question/answer exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: i64,
    /// Browser session the exchange belongs to
    pub session_id: String,
    /// Document the question was scoped to (None for cross-document or comparisons)
    pub document_id: Option<i64>,
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
    /// Retrieved text the answer was grounded on
    pub context_used: Option<String>,
}

/// Fields needed to insert a conversation row
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub session_id: String,
    pub document_id: Option<i64>,
    pub question: String,
    pub answer: String,
    pub context_used: Option<String>,
}

/// A prior exchange replayed into a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl From<&Conversation> for Turn {
    fn from(conv: &Conversation) -> Self {
        Self {
            question: conv.question.clone(),
            answer: conv.answer.clone(),
        }
    }
}

/// Pick the `limit` most recent turns from a newest-first history and return
/// them oldest first.
pub fn recent_turns(history_newest_first: &[Conversation], limit: usize) -> Vec<Turn> {
    history_newest_first
        .iter()
        .take(limit)
        .rev()
        .map(Turn::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv(id: i64, question: &str) -> Conversation {
        Conversation {
            id,
            session_id: "s".into(),
            document_id: None,
            question: question.into(),
            answer: format!("answer to {}", question),
            timestamp: Utc::now(),
            context_used: None,
        }
    }

    #[test]
    fn test_recent_turns_oldest_first() {
        // newest first, as loaded from the store
        let history = vec![conv(4, "q4"), conv(3, "q3"), conv(2, "q2"), conv(1, "q1")];

        let turns = recent_turns(&history, 3);
        let questions: Vec<&str> = turns.iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_recent_turns_short_history() {
        let history = vec![conv(1, "only")];
        assert_eq!(recent_turns(&history, 5).len(), 1);
        assert!(recent_turns(&[], 5).is_empty());
    }
}
