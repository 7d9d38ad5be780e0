//! Chat endpoints: index building and conversational queries

use axum::{
    extract::{Multipart, State},
    Form, Json,
};

use crate::config::PortalConfig;
use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ChatAnswer, ChatQuery, IndexOptions, IndexResponse};

use super::{parse_bool, read_multipart};

/// POST /chat/index - upload files and build the session index
pub async fn build_index(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<IndexResponse>> {
    let payload = read_multipart(multipart).await?;
    let options = index_options(&payload.fields)?;
    let (_, _, k) = resolve_limits(&options, state.config())?;

    let files: Vec<(String, Vec<u8>)> = payload
        .files
        .into_iter()
        .map(|f| (f.filename, f.data))
        .collect();

    let outcome = state.ingestor().build_index(files, &options).await?;

    Ok(Json(IndexResponse {
        session_id: outcome.session_id.as_str().to_string(),
        k,
        use_session_dirs: options.use_session_dirs,
        documents: outcome.documents,
        chunks_added: outcome.chunks_added,
        skipped: outcome.skipped,
    }))
}

/// POST /chat/query - answer a question against a session's index
pub async fn query(
    State(state): State<AppState>,
    Form(query): Form<ChatQuery>,
) -> Result<Json<ChatAnswer>> {
    if query.question.trim().is_empty() {
        return Err(Error::BadRequest("question must not be empty".to_string()));
    }
    if query.k == Some(0) {
        return Err(Error::BadRequest("k must be positive".to_string()));
    }
    let answer = state.rag().invoke(&query, &[]).await?;
    Ok(Json(answer))
}

/// Build index options from the request's form fields; absent fields stay
/// unset so the configured defaults apply downstream
fn index_options(fields: &std::collections::HashMap<String, String>) -> Result<IndexOptions> {
    let mut options = IndexOptions::default();

    if let Some(session_id) = fields.get("session_id") {
        if !session_id.trim().is_empty() {
            options.session_id = Some(session_id.trim().to_string());
        }
    }
    if let Some(raw) = fields.get("use_session_dirs") {
        options.use_session_dirs = parse_bool(raw)?;
    }
    if let Some(raw) = fields.get("chunk_size") {
        options.chunk_size = Some(parse_usize("chunk_size", raw)?);
    }
    if let Some(raw) = fields.get("chunk_overlap") {
        options.chunk_overlap = Some(parse_usize("chunk_overlap", raw)?);
    }
    if let Some(raw) = fields.get("k") {
        options.k = Some(parse_usize("k", raw)?);
    }

    Ok(options)
}

/// Resolve the effective chunking and retrieval limits for a request and
/// validate them as a pair
fn resolve_limits(options: &IndexOptions, config: &PortalConfig) -> Result<(usize, usize, usize)> {
    let chunk_size = options.chunk_size.unwrap_or(config.chunking.chunk_size);
    let chunk_overlap = options.chunk_overlap.unwrap_or(config.chunking.chunk_overlap);
    let k = options.k.unwrap_or(config.retrieval.top_k);

    if chunk_size == 0 {
        return Err(Error::BadRequest("chunk_size must be positive".to_string()));
    }
    if chunk_overlap >= chunk_size {
        return Err(Error::BadRequest(
            "chunk_overlap must be smaller than chunk_size".to_string(),
        ));
    }
    if k == 0 {
        return Err(Error::BadRequest("k must be positive".to_string()));
    }

    Ok((chunk_size, chunk_overlap, k))
}

fn parse_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| Error::BadRequest(format!("invalid {name}: {raw:?}")))
}
