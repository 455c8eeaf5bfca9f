//! Document comparison endpoint

use axum::{extract::State, Extension, Json};

use crate::error::{Error, Result};
use crate::generation::comparison_question;
use crate::server::extract::AppJson;
use crate::server::session::SessionId;
use crate::server::state::AppState;
use crate::types::{response::CompareResponse, CompareRequest, NewConversation};

/// POST /compare_documents - Compare two or more documents
pub async fn compare_documents(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    AppJson(request): AppJson<CompareRequest>,
) -> Result<Json<CompareResponse>> {
    let ids = request.unique_ids();
    if ids.len() < 2 {
        return Err(Error::validation("At least 2 documents required for comparison"));
    }

    let documents = state.db().get_documents(&ids)?;
    if documents.len() != ids.len() {
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !documents.iter().any(|d| d.id == **id))
            .map(|id| id.to_string())
            .collect();
        return Err(Error::DocumentNotFound(missing.join(", ")));
    }

    let comparison = state
        .comparator()
        .compare(&documents, request.mode())
        .await?;

    let conversation = state.db().insert_conversation(&NewConversation {
        session_id: session.id().to_string(),
        document_id: None,
        question: comparison_question(&documents),
        answer: comparison.clone(),
        context_used: Some(format!("Compared {} documents", documents.len())),
    })?;

    Ok(Json(CompareResponse {
        success: true,
        comparison,
        conversation,
    }))
}
