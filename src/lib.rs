//! document-portal: per-session document Q&A with an LLM backend
//!
//! The portal accepts PDF (and plain-text/DOCX) uploads, extracts and chunks
//! their text, embeds the chunks through a hosted provider, and keeps one
//! vector index per session on disk. On top of that sit three LLM-backed
//! operations: conversational retrieval over a session index, single-document
//! analysis into structured metadata, and pairwise document comparison.

pub mod analysis;
pub mod compare;
pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::PortalConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, ChunkSource, Document, FileType},
    session::SessionId,
};
