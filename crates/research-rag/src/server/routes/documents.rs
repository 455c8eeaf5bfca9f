//! Document upload, listing and deletion

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::extract::AppPath;
use crate::server::state::AppState;
use crate::types::{
    response::{DocumentListResponse, MessageResponse, UploadResponse},
    FileType, NewDocument,
};

/// POST /upload - Store a file and run ingestion
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::multipart("Failed to read multipart field", e))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::multipart("Failed to read file", e))?;
        upload = Some((filename, data));
        break;
    }

    let (original_filename, data) = upload
        .filter(|(name, _)| !name.trim().is_empty())
        .ok_or_else(|| Error::validation("No file selected"))?;

    let file_type = FileType::from_path(&original_filename).ok_or_else(|| {
        Error::UnsupportedFileType("File type not supported. Please upload PDF or TXT files.".into())
    })?;

    tracing::info!("Upload received: {} ({} bytes)", original_filename, data.len());

    let stored = state.uploads().save(&original_filename, &data).await?;
    let document = state.db().insert_document(&NewDocument {
        filename: stored.filename,
        original_filename,
        file_path: stored.path.clone(),
        file_type,
    })?;

    match state.pipeline().process_document(&stored.path, document.id).await {
        Ok(outcome) => {
            let document = state.db().mark_processed(document.id, &outcome.summary)?;
            tracing::info!(
                "Document {} processed ({} chunks)",
                document.id,
                outcome.chunk_count
            );
            Ok(Json(UploadResponse {
                success: true,
                message: "File uploaded successfully".to_string(),
                document,
                processing_error: None,
            }))
        }
        Err(e) => {
            tracing::error!("Failed to process document {}: {}", document.id, e);
            Ok(Json(UploadResponse {
                success: true,
                message: "File uploaded but could not be processed".to_string(),
                document,
                processing_error: Some(e.to_string()),
            }))
        }
    }
}

/// GET /documents - All documents, newest first
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<DocumentListResponse>> {
    Ok(Json(DocumentListResponse {
        success: true,
        documents: state.db().list_documents()?,
    }))
}

/// DELETE /delete_document/:id - Remove a document, its file, index and conversations
pub async fn delete_document(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<MessageResponse>> {
    let document = state
        .db()
        .delete_document(id)?
        .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;

    state.pipeline().forget(id);
    if let Err(e) = state.uploads().remove(&document.file_path).await {
        tracing::warn!(
            "Document {} deleted but its file {} was not removed: {}",
            id,
            document.file_path.display(),
            e
        );
    }

    tracing::info!("Deleted document {} ({})", id, document.original_filename);
    Ok(Json(MessageResponse::ok("Document deleted successfully")))
}
