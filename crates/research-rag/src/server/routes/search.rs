//! Semantic search endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::extract::AppJson;
use crate::server::state::AppState;
use crate::types::{response::SearchResponse, SearchRequest};

/// POST /search_documents - Nearest chunks across every indexed document
pub async fn search_documents(
    State(state): State<AppState>,
    AppJson(request): AppJson<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let results = state.search().search(&request.query).await?;

    Ok(Json(SearchResponse {
        success: true,
        query: request.query.trim().to_string(),
        results,
    }))
}
