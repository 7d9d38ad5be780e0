//! Session management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::SessionId;

/// GET /sessions - list known sessions, newest first
pub async fn list_sessions(State(state): State<AppState>) -> Result<Json<Value>> {
    let sessions: Vec<String> = state
        .sessions()
        .list_sessions()?
        .into_iter()
        .map(|s| s.as_str().to_string())
        .collect();
    Ok(Json(json!({ "sessions": sessions })))
}

/// DELETE /sessions/:id - remove a session's uploads, index, and lock entry
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let session = SessionId::parse(&id)?;

    let uploads_removed = match state.sessions().delete_session(&session) {
        Ok(()) => true,
        Err(Error::SessionNotFound(_)) => false,
        Err(e) => return Err(e),
    };
    let index_removed = state.index_manager().delete_index(&session)?;

    if !uploads_removed && !index_removed {
        return Err(Error::SessionNotFound(session.to_string()));
    }

    tracing::info!(
        "Deleted session {} (uploads: {}, index: {})",
        session,
        uploads_removed,
        index_removed
    );
    Ok(Json(json!({
        "session_id": session.as_str(),
        "uploads_removed": uploads_removed,
        "index_removed": index_removed,
    })))
}
