//! On-disk vector index for one session's corpus
//!
//! Session corpora are small (one user's uploads), so the index is a flat
//! list of embedded chunks with exact cosine search, serialized as a single
//! JSON file next to the session's other artifacts. Exact search over a few
//! thousand vectors is faster than maintaining an ANN structure would be,
//! and the file moves/deletes atomically with the session.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity mapped into [0, 1]
    pub similarity: f32,
}

/// Serialized index layout
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionIndex {
    /// Format version for forward compatibility
    #[serde(default = "default_version")]
    version: u32,
    /// Embedding dimensions; fixed by the first inserted chunk
    dimensions: Option<usize>,
    /// Documents contributing to this index, keyed by id
    documents: HashMap<Uuid, Document>,
    /// Embedded chunks
    chunks: Vec<Chunk>,
}

fn default_version() -> u32 {
    1
}

impl SessionIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            version: 1,
            dimensions: None,
            documents: HashMap::new(),
            chunks: Vec::new(),
        }
    }

    /// Load an index from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IndexNotFound(format!("{}: {}", path.display(), e))
        })?;
        let index: Self = serde_json::from_str(&content)?;
        Ok(index)
    }

    /// Persist the index to disk (write-then-rename so readers never see a
    /// partial file)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string(self)?;
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Register a document and insert its embedded chunks
    pub fn insert_chunks(&mut self, document: Document, chunks: Vec<Chunk>) -> Result<usize> {
        let mut inserted = 0;
        for chunk in chunks {
            if chunk.embedding.is_empty() {
                return Err(Error::Internal(format!(
                    "chunk {} has no embedding",
                    chunk.id
                )));
            }
            match self.dimensions {
                None => self.dimensions = Some(chunk.embedding.len()),
                Some(d) if d != chunk.embedding.len() => {
                    return Err(Error::Internal(format!(
                        "embedding dimension mismatch: index has {}, chunk has {}",
                        d,
                        chunk.embedding.len()
                    )));
                }
                Some(_) => {}
            }
            self.chunks.push(chunk);
            inserted += 1;
        }
        self.documents.insert(document.id, document);
        Ok(inserted)
    }

    /// Find a document already indexed with the given content hash
    pub fn find_by_hash(&self, content_hash: &str) -> Option<&Document> {
        self.documents
            .values()
            .find(|d| d.content_hash == content_hash)
    }

    /// Exact cosine search over all chunks
    pub fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<ScoredChunk>> {
        if let Some(d) = self.dimensions {
            if d != query_embedding.len() {
                return Err(Error::Internal(format!(
                    "query dimension mismatch: index has {}, query has {}",
                    d,
                    query_embedding.len()
                )));
            }
        }

        let mut results: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let sim = cosine_similarity(query_embedding, &chunk.embedding);
                // Map [-1, 1] to [0, 1] so thresholds read naturally
                let similarity = (sim + 1.0) / 2.0;
                (similarity >= threshold).then(|| ScoredChunk {
                    chunk: chunk.clone(),
                    similarity,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);
        Ok(results)
    }

    /// Remove a document and all its chunks
    pub fn delete_by_document(&mut self, document_id: &Uuid) -> usize {
        let before = self.chunks.len();
        self.chunks.retain(|c| c.document_id != *document_id);
        self.documents.remove(document_id);
        before - self.chunks.len()
    }

    /// Documents in this index
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Number of chunks stored
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Cosine similarity of two equal-length vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkSource, FileType};

    fn embedded_chunk(doc_id: Uuid, content: &str, embedding: Vec<f32>, index: u32) -> Chunk {
        let mut chunk = Chunk::new(
            doc_id,
            content.to_string(),
            ChunkSource::plain("test.txt".into(), FileType::Txt),
            0,
            content.len(),
            index,
        );
        chunk.embedding = embedding;
        chunk
    }

    fn test_doc() -> Document {
        Document::new("test.txt".into(), FileType::Txt, "hash".into(), 10)
    }

    #[test]
    fn search_orders_by_similarity() {
        let mut index = SessionIndex::new();
        let doc = test_doc();
        let chunks = vec![
            embedded_chunk(doc.id, "east", vec![1.0, 0.0], 0),
            embedded_chunk(doc.id, "north", vec![0.0, 1.0], 1),
            embedded_chunk(doc.id, "northeast", vec![0.7, 0.7], 2),
        ];
        index.insert_chunks(doc, chunks).unwrap();

        let results = index.search(&[1.0, 0.0], 2, 0.0).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "east");
        assert_eq!(results[1].chunk.content, "northeast");
        assert!(results[0].similarity > results[1].similarity);
    }

    #[test]
    fn threshold_filters_results() {
        let mut index = SessionIndex::new();
        let doc = test_doc();
        let chunks = vec![
            embedded_chunk(doc.id, "same", vec![1.0, 0.0], 0),
            embedded_chunk(doc.id, "opposite", vec![-1.0, 0.0], 1),
        ];
        index.insert_chunks(doc, chunks).unwrap();

        let results = index.search(&[1.0, 0.0], 10, 0.9).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "same");
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let mut index = SessionIndex::new();
        let doc = test_doc();
        index
            .insert_chunks(doc, vec![embedded_chunk(Uuid::new_v4(), "x", vec![1.0, 0.0], 0)])
            .unwrap();

        assert!(index.search(&[1.0, 0.0, 0.0], 5, 0.0).is_err());

        let doc2 = test_doc();
        let bad = vec![embedded_chunk(doc2.id, "y", vec![1.0, 0.0, 0.0], 0)];
        assert!(index.insert_chunks(doc2, bad).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let mut index = SessionIndex::new();
        let doc = test_doc();
        let hash = doc.content_hash.clone();
        index
            .insert_chunks(doc, vec![embedded_chunk(Uuid::new_v4(), "persisted", vec![0.5, 0.5], 0)])
            .unwrap();
        index.save(&path).unwrap();

        let loaded = SessionIndex::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.find_by_hash(&hash).is_some());
        let results = loaded.search(&[0.5, 0.5], 1, 0.0).unwrap();
        assert_eq!(results[0].chunk.content, "persisted");
    }

    #[test]
    fn missing_index_maps_to_not_found() {
        let err = SessionIndex::load(Path::new("/nonexistent/index.json")).unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(_)));
    }

    #[test]
    fn delete_by_document_removes_chunks() {
        let mut index = SessionIndex::new();
        let doc = test_doc();
        let doc_id = doc.id;
        index
            .insert_chunks(
                doc,
                vec![
                    embedded_chunk(doc_id, "a", vec![1.0, 0.0], 0),
                    embedded_chunk(doc_id, "b", vec![0.0, 1.0], 1),
                ],
            )
            .unwrap();
        assert_eq!(index.delete_by_document(&doc_id), 2);
        assert!(index.is_empty());
    }
}
