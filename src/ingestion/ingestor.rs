//! End-to-end index building for uploaded files

use std::sync::Arc;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::index::IndexManager;
use crate::providers::EmbeddingProvider;
use crate::storage::DocumentHandler;
use crate::types::{Document, DocumentSummary, IndexOptions, SessionId};

use super::chunker::TextChunker;
use super::parser::FileParser;

/// Result of one index build
#[derive(Debug)]
pub struct IngestOutcome {
    /// Session the index was written under
    pub session_id: SessionId,
    /// Documents added in this call
    pub documents: Vec<DocumentSummary>,
    /// Chunks embedded and inserted
    pub chunks_added: usize,
    /// Filenames skipped because identical content was already indexed
    pub skipped: Vec<String>,
}

/// Builds and updates session indexes from uploaded files.
///
/// The pipeline is: save the upload, extract text, chunk, embed, insert into
/// the session index, persist. Files whose content hash is already in the
/// index are skipped rather than re-embedded.
pub struct ChatIngestor {
    handler: DocumentHandler,
    manager: Arc<IndexManager>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunking: ChunkingConfig,
}

impl ChatIngestor {
    /// Create an ingestor over storage, index, and embedding backends
    pub fn new(
        handler: DocumentHandler,
        manager: Arc<IndexManager>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunking: &ChunkingConfig,
    ) -> Self {
        Self {
            handler,
            manager,
            embedder,
            chunking: chunking.clone(),
        }
    }

    /// Build or extend an index from a batch of uploads.
    ///
    /// `files` carries (filename, bytes) pairs as received from the multipart
    /// request. A missing session id gets a freshly generated one, which the
    /// outcome reports back to the client.
    pub async fn build_index(
        &self,
        files: Vec<(String, Vec<u8>)>,
        opts: &IndexOptions,
    ) -> Result<IngestOutcome> {
        if files.is_empty() {
            return Err(Error::BadRequest("no files uploaded".to_string()));
        }

        let session_id = match &opts.session_id {
            Some(raw) => SessionId::parse(raw)?,
            None => SessionId::generate(),
        };
        let session_ref = opts.use_session_dirs.then_some(&session_id);

        // One writer per session; ingestion rewrites the index file whole
        let lock = self.manager.lock_for(session_ref);
        let _guard = lock.lock().await;

        let mut index = self.manager.open_or_create(session_ref, opts.use_session_dirs)?;

        // Request options win; the configured values fill the gaps
        let chunk_size = opts.chunk_size.unwrap_or(self.chunking.chunk_size);
        let chunk_overlap = opts.chunk_overlap.unwrap_or(self.chunking.chunk_overlap);
        let chunker =
            TextChunker::new(chunk_size, chunk_overlap).with_min_size(self.chunking.min_chunk_size);

        let mut documents = Vec::new();
        let mut skipped = Vec::new();
        let mut chunks_added = 0usize;

        for (filename, data) in files {
            let file_size = data.len() as u64;
            self.handler.save_upload(&session_id, &filename, &data)?;

            // PDF extraction can be CPU-heavy; keep it off the async runtime
            let parse_name = filename.clone();
            let parsed = tokio::task::spawn_blocking(move || FileParser::parse(&parse_name, &data))
                .await
                .map_err(|e| Error::Internal(format!("parse task failed: {e}")))??;

            if let Some(existing) = index.find_by_hash(&parsed.content_hash) {
                tracing::info!(
                    "Skipping {}: content already indexed as {}",
                    filename,
                    existing.filename
                );
                skipped.push(filename);
                continue;
            }

            let mut document = Document::new(
                filename.clone(),
                parsed.file_type.clone(),
                parsed.content_hash.clone(),
                file_size,
            );
            document.total_pages = parsed.total_pages;

            let mut chunks = chunker.chunk_document(&document, &parsed);
            if chunks.is_empty() {
                return Err(Error::file_parse(
                    &filename,
                    "no extractable text content",
                ));
            }
            document.total_chunks = chunks.len() as u32;

            let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            if embeddings.len() != chunks.len() {
                return Err(Error::Embedding(format!(
                    "expected {} embeddings, got {}",
                    chunks.len(),
                    embeddings.len()
                )));
            }
            for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
                chunk.embedding = embedding;
            }

            tracing::info!(
                "Indexed {} into session {}: {} chunks, {} pages",
                filename,
                session_id,
                chunks.len(),
                document.total_pages.unwrap_or(1)
            );
            documents.push(DocumentSummary::from(&document));
            chunks_added += index.insert_chunks(document, chunks)?;
        }

        if chunks_added > 0 {
            self.manager.save(&index, session_ref, opts.use_session_dirs)?;
        }

        Ok(IngestOutcome {
            session_id,
            documents,
            chunks_added,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::storage::SessionStore;
    use async_trait::async_trait;

    /// Deterministic embedder for tests: hashes text into a tiny vector
    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            let len = text.len() as f32;
            Ok(vec![len, 1.0 / (len + 1.0), 0.5])
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn ingestor_with(
        base: &std::path::Path,
        chunking: ChunkingConfig,
    ) -> (ChatIngestor, Arc<IndexManager>) {
        let storage = StorageConfig {
            upload_base: base.join("data"),
            index_base: base.join("index"),
            index_name: "index".to_string(),
            use_session_dirs: true,
        };
        let manager = Arc::new(IndexManager::new(&storage));
        let handler = DocumentHandler::new(SessionStore::new(&storage));
        (
            ChatIngestor::new(handler, manager.clone(), Arc::new(StubEmbedder), &chunking),
            manager,
        )
    }

    fn ingestor(base: &std::path::Path) -> (ChatIngestor, Arc<IndexManager>) {
        ingestor_with(
            base,
            ChunkingConfig {
                min_chunk_size: 5,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn builds_index_and_generates_session() {
        let dir = tempfile::tempdir().unwrap();
        let (ingestor, manager) = ingestor(dir.path());

        let outcome = ingestor
            .build_index(
                vec![("notes.txt".to_string(), b"A document with enough text to chunk.".to_vec())],
                &IndexOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.documents.len(), 1);
        assert!(outcome.chunks_added > 0);
        assert!(outcome.skipped.is_empty());

        let index = manager.load(Some(&outcome.session_id), true).unwrap();
        assert_eq!(index.len(), outcome.chunks_added);
    }

    #[tokio::test]
    async fn configured_chunking_applies_when_options_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let (ingestor, _) = ingestor_with(
            dir.path(),
            ChunkingConfig {
                chunk_size: 60,
                chunk_overlap: 10,
                min_chunk_size: 5,
            },
        );

        let text = "Each of these sentences adds length to the document body. ".repeat(10);
        let outcome = ingestor
            .build_index(
                vec![("long.txt".to_string(), text.into_bytes())],
                &IndexOptions::default(),
            )
            .await
            .unwrap();

        assert!(
            outcome.chunks_added > 1,
            "configured chunk_size of 60 should split ~600 chars, got {} chunk(s)",
            outcome.chunks_added
        );
    }

    #[tokio::test]
    async fn request_options_override_configured_chunking() {
        let dir = tempfile::tempdir().unwrap();
        let (ingestor, _) = ingestor_with(
            dir.path(),
            ChunkingConfig {
                chunk_size: 60,
                chunk_overlap: 10,
                min_chunk_size: 5,
            },
        );

        let text = "Each of these sentences adds length to the document body. ".repeat(10);
        let opts = IndexOptions {
            chunk_size: Some(5000),
            chunk_overlap: Some(0),
            ..IndexOptions::default()
        };
        let outcome = ingestor
            .build_index(vec![("long.txt".to_string(), text.into_bytes())], &opts)
            .await
            .unwrap();

        assert_eq!(outcome.chunks_added, 1);
    }

    #[tokio::test]
    async fn duplicate_content_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (ingestor, _) = ingestor(dir.path());

        let opts = IndexOptions::default();
        let first = ingestor
            .build_index(
                vec![("a.txt".to_string(), b"Identical content for both uploads.".to_vec())],
                &opts,
            )
            .await
            .unwrap();

        let opts = IndexOptions {
            session_id: Some(first.session_id.as_str().to_string()),
            ..IndexOptions::default()
        };
        let second = ingestor
            .build_index(
                vec![("b.txt".to_string(), b"Identical content for both uploads.".to_vec())],
                &opts,
            )
            .await
            .unwrap();

        assert_eq!(second.chunks_added, 0);
        assert_eq!(second.skipped, vec!["b.txt".to_string()]);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (ingestor, _) = ingestor(dir.path());
        let err = ingestor
            .build_index(Vec::new(), &IndexOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
