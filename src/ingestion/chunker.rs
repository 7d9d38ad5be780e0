//! Text chunking with page and position tracking

use unicode_segmentation::UnicodeSegmentation;

use super::parser::ParsedDocument;
use crate::types::{Chunk, ChunkSource, Document};

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
    /// Minimum chunk size
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
            min_size: 50,
        }
    }

    /// Override the minimum chunk size
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Chunk a parsed document
    pub fn chunk_document(&self, doc: &Document, parsed: &ParsedDocument) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in &parsed.pages {
            let page_number = if parsed.pages.len() > 1 || parsed.total_pages.is_some() {
                Some(page.page_number)
            } else {
                None
            };
            let page_chunks = self.chunk_text(
                &page.content,
                doc,
                page_number,
                parsed.total_pages,
                page.char_offset,
                chunks.len() as u32,
            );
            chunks.extend(page_chunks);
        }

        chunks
    }

    /// Chunk one block of text, carrying overlap across chunk borders
    fn chunk_text(
        &self,
        text: &str,
        doc: &Document,
        page_number: Option<u32>,
        page_count: Option<u32>,
        base_offset: usize,
        start_index: u32,
    ) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_start = 0usize;
        let mut chunk_index = start_index;
        let mut char_pos = 0usize;

        for sentence in text.split_sentence_bounds() {
            let sentence_len = sentence.len();

            if !current.is_empty() && current.len() + sentence_len > self.chunk_size {
                if current.trim().len() >= self.min_size {
                    chunks.push(self.make_chunk(
                        doc,
                        &current,
                        page_number,
                        page_count,
                        base_offset + current_start,
                        base_offset + char_pos,
                        chunk_index,
                    ));
                    chunk_index += 1;
                }

                let overlap_text = self.overlap_tail(&current);
                current_start = char_pos.saturating_sub(overlap_text.len());
                current = overlap_text;
            }

            current.push_str(sentence);
            char_pos += sentence_len;
        }

        if current.trim().len() >= self.min_size {
            chunks.push(self.make_chunk(
                doc,
                &current,
                page_number,
                page_count,
                base_offset + current_start,
                base_offset + char_pos,
                chunk_index,
            ));
        }

        chunks
    }

    fn make_chunk(
        &self,
        doc: &Document,
        content: &str,
        page_number: Option<u32>,
        page_count: Option<u32>,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Chunk {
        let source = ChunkSource {
            filename: doc.filename.clone(),
            file_type: doc.file_type.clone(),
            page_number,
            page_count,
        };
        Chunk::new(
            doc.id,
            content.trim().to_string(),
            source,
            char_start,
            char_end,
            chunk_index,
        )
    }

    /// Tail of a chunk to repeat at the start of the next one, preferring a
    /// sentence or word boundary
    fn overlap_tail(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }
        if text.len() <= self.overlap {
            return text.to_string();
        }

        let mut start = text.len().saturating_sub(self.overlap);
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }
        let tail = &text[start..];

        if let Some(pos) = tail.find(". ") {
            return tail[pos + 2..].to_string();
        }
        if let Some(pos) = tail.find(' ') {
            return tail[pos + 1..].to_string();
        }
        tail.to_string()
    }
}
