//! Core types for the document portal

pub mod document;
pub mod query;
pub mod response;
pub mod session;

pub use document::{Chunk, ChunkSource, Document, FileType};
pub use query::{ChatQuery, ChatTurn, IndexOptions};
pub use response::{
    AnalyzeResponse, ChatAnswer, ComparisonRow, CompareResponse, DocumentMetadata,
    DocumentSummary, IndexResponse, SourceRef,
};
pub use session::SessionId;
