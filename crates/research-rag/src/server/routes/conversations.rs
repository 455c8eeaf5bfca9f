//! Session history: listing, clearing and markdown export

use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::error::{Error, Result};
use crate::server::session::{RotateSession, SessionId};
use crate::server::state::AppState;
use crate::types::{
    response::{ConversationListResponse, ExportResponse, MessageResponse},
    Conversation,
};

/// GET /conversations - This session's history, oldest first
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<ConversationListResponse>> {
    let conversations = if session.is_new() {
        Vec::new()
    } else {
        state.db().list_conversations(session.id())?
    };

    Ok(Json(ConversationListResponse {
        success: true,
        conversations,
    }))
}

/// POST /clear_session - Delete this session's history and start a new session
pub async fn clear_session(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<(Extension<RotateSession>, Json<MessageResponse>)> {
    if !session.is_new() {
        let removed = state.db().clear_session(session.id())?;
        tracing::info!("Cleared session {} ({} conversations)", session.id(), removed);
    }

    Ok((
        Extension(RotateSession::new()),
        Json(MessageResponse::ok("Session cleared")),
    ))
}

/// POST /export_conversation - Markdown transcript of this session
pub async fn export_conversation(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<ExportResponse>> {
    if session.is_new() {
        return Err(Error::validation("No active session"));
    }

    let conversations = state.db().list_conversations(session.id())?;
    if conversations.is_empty() {
        return Err(Error::validation("No conversations to export"));
    }

    let session_prefix: String = session.id().chars().take(8).collect();
    Ok(Json(ExportResponse {
        success: true,
        export_text: render_export(session.id(), &conversations),
        filename: format!("research_conversation_{}.md", session_prefix),
    }))
}

fn render_export(session_id: &str, conversations: &[Conversation]) -> String {
    let mut text = String::from("# AI Research Assistant Conversation Export\n\n");
    text.push_str(&format!(
        "Generated on: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    text.push_str(&format!("Session ID: {}\n\n", session_id));
    text.push_str("---\n\n");

    for conv in conversations {
        text.push_str(&format!("**Q:** {}\n\n", conv.question));
        text.push_str(&format!("**A:** {}\n\n", conv.answer));
        text.push_str(&format!(
            "*Time: {}*\n\n",
            conv.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
        text.push_str("---\n\n");
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_export() {
        let conv = Conversation {
            id: 1,
            session_id: "abcdef1234".into(),
            document_id: None,
            question: "What is soil carbon?".into(),
            answer: "Carbon stored in soil.".into(),
            timestamp: Utc::now(),
            context_used: None,
        };

        let text = render_export("abcdef1234", &[conv.clone(), conv]);
        assert!(text.starts_with("# AI Research Assistant Conversation Export\n\n"));
        assert!(text.contains("Session ID: abcdef1234\n\n---\n\n"));
        assert_eq!(text.matches("**Q:** What is soil carbon?").count(), 2);
        assert!(text.contains("**A:** Carbon stored in soil.\n\n*Time: "));
        assert!(text.ends_with("---\n\n"));
    }
}
