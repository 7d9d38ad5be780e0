//! Document ingestion: parsing, chunking, and session index building

mod chunker;
mod ingestor;
mod parser;

pub use chunker::TextChunker;
pub use ingestor::{ChatIngestor, IngestOutcome};
pub use parser::{FileParser, PageContent, ParsedDocument};
