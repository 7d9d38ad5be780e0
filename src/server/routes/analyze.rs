//! Document analysis endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AnalyzeResponse, SessionId};

use super::read_multipart;

/// POST /analyze - upload one document and extract structured metadata.
///
/// Each call stores the upload under a fresh session so the raw file remains
/// inspectable afterwards.
pub async fn analyze_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>> {
    let mut payload = read_multipart(multipart).await?;
    if payload.files.is_empty() {
        return Err(Error::BadRequest("no file uploaded".to_string()));
    }
    let upload = payload.files.remove(0);

    let session_id = SessionId::generate();
    let path = state
        .handler()
        .save_upload(&session_id, &upload.filename, &upload.data)?;

    let handler = state.handler().clone();
    let parsed = tokio::task::spawn_blocking(move || handler.read_document(&path))
        .await
        .map_err(|e| Error::Internal(format!("parse task failed: {e}")))??;

    if parsed.content.trim().is_empty() {
        return Err(Error::file_parse(&upload.filename, "no extractable text content"));
    }

    tracing::info!(
        "Analyzing {} ({} chars) in session {}",
        upload.filename,
        parsed.content.len(),
        session_id
    );
    let metadata = state.analyzer().analyze(&parsed.content).await?;

    Ok(Json(AnalyzeResponse {
        metadata,
        session_id: session_id.as_str().to_string(),
    }))
}
