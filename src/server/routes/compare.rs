//! Document comparison endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::compare::DocumentComparator;
use crate::error::{Error, Result};
use crate::ingestion::ParsedDocument;
use crate::server::state::AppState;
use crate::types::{CompareResponse, SessionId};

use super::{read_multipart, UploadedFile};

/// POST /compare - upload a reference and an updated document, report
/// page-wise changes.
///
/// Both files are stored under one fresh session.
pub async fn compare_documents(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CompareResponse>> {
    let mut payload = read_multipart(multipart).await?;
    let reference = payload.take_file("reference")?;
    let actual = payload.take_file("actual")?;

    let session_id = SessionId::generate();
    let reference_doc = save_and_parse(&state, &session_id, reference).await?;
    let actual_doc = save_and_parse(&state, &session_id, actual).await?;

    tracing::info!(
        "Comparing {} pages against {} pages in session {}",
        reference_doc.pages.len(),
        actual_doc.pages.len(),
        session_id
    );

    let combined = DocumentComparator::combine(&reference_doc, &actual_doc);
    let rows = state.comparator().compare(&combined).await?;

    Ok(Json(CompareResponse {
        rows,
        session_id: session_id.as_str().to_string(),
    }))
}

async fn save_and_parse(
    state: &AppState,
    session_id: &SessionId,
    upload: UploadedFile,
) -> Result<ParsedDocument> {
    let path = state
        .handler()
        .save_upload(session_id, &upload.filename, &upload.data)?;

    let handler = state.handler().clone();
    let parsed = tokio::task::spawn_blocking(move || handler.read_document(&path))
        .await
        .map_err(|e| Error::Internal(format!("parse task failed: {e}")))??;

    if parsed.content.trim().is_empty() {
        return Err(Error::file_parse(&upload.filename, "no extractable text content"));
    }
    Ok(parsed)
}
