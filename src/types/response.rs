//! Response types for the portal API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Document, FileType};

/// Summary of an ingested document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document ID
    pub id: Uuid,
    /// Filename
    pub filename: String,
    /// File type
    pub file_type: FileType,
    /// Number of pages (if applicable)
    pub total_pages: Option<u32>,
    /// Number of chunks created
    pub total_chunks: u32,
    /// File size in bytes
    pub file_size: u64,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            file_type: doc.file_type.clone(),
            total_pages: doc.total_pages,
            total_chunks: doc.total_chunks,
            file_size: doc.file_size,
        }
    }
}

/// Response from building/updating a session index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Session whose index was written
    pub session_id: String,
    /// Retrieval depth recorded with the request
    pub k: usize,
    /// Whether the index is session-scoped
    pub use_session_dirs: bool,
    /// Documents indexed in this call
    pub documents: Vec<DocumentSummary>,
    /// Chunks added to the index in this call
    pub chunks_added: usize,
    /// Files skipped because identical content was already indexed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// A retrieved source backing part of a chat answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source filename
    pub filename: String,
    /// Page number (if applicable)
    pub page_number: Option<u32>,
    /// Similarity score (0.0-1.0)
    pub similarity: f32,
    /// Snippet of the retrieved chunk
    pub snippet: String,
}

/// Response from a conversational query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    /// Generated answer text
    pub answer: String,
    /// Session that was queried
    pub session_id: Option<String>,
    /// Retrieval depth used
    pub k: usize,
    /// Engine identifier
    pub engine: String,
    /// Sources the answer is grounded on
    pub sources: Vec<SourceRef>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Structured metadata extracted from a document by the analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Bullet-point summary of the document
    #[serde(default)]
    pub summary: Vec<String>,
    /// Document title, or "Not Available"
    #[serde(default = "not_available")]
    pub title: String,
    /// Author, or "Not Available"
    #[serde(default = "not_available")]
    pub author: String,
    /// Creation date, or "Not Available"
    #[serde(default = "not_available")]
    pub date_created: String,
    /// Last modification date, or "Not Available"
    #[serde(default = "not_available")]
    pub last_modified_date: String,
    /// Publisher, or "Not Available"
    #[serde(default = "not_available")]
    pub publisher: String,
    /// Detected language
    #[serde(default = "not_available")]
    pub language: String,
    /// Page count reported by the model, or "Not Available"
    #[serde(default = "not_available")]
    pub page_count: String,
    /// Sentiment or tone of the document
    #[serde(default = "not_available")]
    pub sentiment_tone: String,
}

fn not_available() -> String {
    "Not Available".to_string()
}

/// Response from document analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Extracted metadata
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
    /// Session the upload was stored under
    pub session_id: String,
}

/// One row of a pairwise document comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Page the change was found on
    #[serde(rename = "Page")]
    pub page: String,
    /// Description of the change, or "NO CHANGE"
    #[serde(rename = "Changes")]
    pub changes: String,
}

/// Response from document comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    /// Page-wise comparison rows
    pub rows: Vec<ComparisonRow>,
    /// Session the uploads were stored under
    pub session_id: String,
}
