//! Request types for indexing and chat

use serde::{Deserialize, Serialize};

/// Options controlling one index build, carried as form fields alongside
/// the uploaded files.
///
/// Absent numeric fields fall back to the server's configured defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Explicit session id; a fresh one is generated when absent
    #[serde(default)]
    pub session_id: Option<String>,
    /// Scope the index per session (default true)
    #[serde(default = "default_use_session_dirs")]
    pub use_session_dirs: bool,
    /// Chunk size in characters
    #[serde(default)]
    pub chunk_size: Option<usize>,
    /// Overlap between chunks in characters
    #[serde(default)]
    pub chunk_overlap: Option<usize>,
    /// Retrieval depth recorded with the index
    #[serde(default)]
    pub k: Option<usize>,
}

fn default_use_session_dirs() -> bool {
    true
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            session_id: None,
            use_session_dirs: true,
            chunk_size: None,
            chunk_overlap: None,
            k: None,
        }
    }
}

/// Chat query form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQuery {
    /// The question to answer
    pub question: String,
    /// Session whose index to query
    #[serde(default)]
    pub session_id: Option<String>,
    /// Whether the index is session-scoped
    #[serde(default = "default_use_session_dirs")]
    pub use_session_dirs: bool,
    /// Number of chunks to retrieve; configured default when absent
    #[serde(default)]
    pub k: Option<usize>,
}

/// One turn of prior conversation, used to contextualize follow-up questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// What the user asked
    pub question: String,
    /// What the portal answered
    pub answer: String,
}
