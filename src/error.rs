//! Error types shared across the portal

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Portal-wide error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Failed to parse {file}: {reason}")]
    FileParse { file: String, reason: String },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("LLM provider error: {0}")]
    Llm(String),

    #[error("Malformed LLM output: {0}")]
    LlmOutput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a file-parse error from any displayable reason
    pub fn file_parse(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::FileParse {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::SessionNotFound(_) | Self::IndexNotFound(_) => StatusCode::NOT_FOUND,
            Self::Embedding(_) | Self::Llm(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::FileParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
