//! Question answering endpoint

use axum::{extract::State, Extension, Json};

use crate::error::{Error, Result};
use crate::server::extract::AppJson;
use crate::server::session::SessionId;
use crate::server::state::AppState;
use crate::types::{response::AskResponse, AskRequest, NewConversation};

/// POST /ask - Answer a question and record the exchange
pub async fn ask_question(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    AppJson(request): AppJson<AskRequest>,
) -> Result<Json<AskResponse>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(Error::validation("Question is required"));
    }

    if let Some(id) = request.document_id {
        if state.db().get_document(id)?.is_none() {
            return Err(Error::DocumentNotFound(id.to_string()));
        }
    }

    let history = state
        .db()
        .recent_conversations(session.id(), state.config().retrieval.history_window)?;

    let answer = state
        .orchestrator()
        .ask(question, request.document_id, &history)
        .await?;

    let conversation = state.db().insert_conversation(&NewConversation {
        session_id: session.id().to_string(),
        document_id: request.document_id,
        question: question.to_string(),
        answer: answer.answer.clone(),
        context_used: Some(answer.context_used),
    })?;

    tracing::info!(
        "Answered question in {:?} mode for session {}",
        answer.mode,
        session.id()
    );

    Ok(Json(AskResponse {
        success: true,
        answer: answer.answer,
        mode: answer.mode,
        conversation,
    }))
}
