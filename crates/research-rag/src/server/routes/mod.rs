//! HTTP routes for the research assistant

pub mod ask;
pub mod compare;
pub mod conversations;
pub mod documents;
pub mod index;
pub mod search;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all application routes
pub fn app_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        // Upload - with larger body limit for files
        .route(
            "/upload",
            post(documents::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/documents", get(documents::list_documents))
        .route("/delete_document/:id", delete(documents::delete_document))
        // Question answering
        .route("/ask", post(ask::ask_question))
        .route("/compare_documents", post(compare::compare_documents))
        .route("/search_documents", post(search::search_documents))
        // Session history
        .route("/conversations", get(conversations::list_conversations))
        .route("/clear_session", post(conversations::clear_session))
        .route("/export_conversation", post(conversations::export_conversation))
}
