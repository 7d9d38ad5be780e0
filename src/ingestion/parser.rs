//! Multi-format file parser

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileType;

/// Parsed document with extracted text and metadata
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Extracted text content
    pub content: String,
    /// Content hash for deduplication
    pub content_hash: String,
    /// Total pages (if applicable)
    pub total_pages: Option<u32>,
    /// Page-level content (PDF only; other formats yield a single page)
    pub pages: Vec<PageContent>,
}

/// Content from a single page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub content: String,
    /// Character offset in the full document
    pub char_offset: usize,
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its filename extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let file_type = FileType::from_filename(filename);

        if !file_type.is_supported() {
            return Err(Error::UnsupportedFileType(filename.to_string()));
        }
        if data.is_empty() {
            return Err(Error::file_parse(filename, "file is empty"));
        }

        match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Docx => Self::parse_docx(filename, data),
            FileType::Txt | FileType::Markdown => Self::parse_text(data, file_type),
            FileType::Unknown => Err(Error::UnsupportedFileType(filename.to_string())),
        }
    }

    /// Parse a PDF document.
    ///
    /// Per-page extraction is the primary path so chunks carry real page
    /// numbers into citations and comparisons. PDFs that lopdf cannot read
    /// fall back to pdf-extract's single text stream, where page boundaries
    /// are unknown.
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        if let Some(parsed) = Self::parse_pdf_per_page(filename, data) {
            return Ok(parsed);
        }

        tracing::warn!(
            "Per-page extraction found no text in {}, trying pdf-extract",
            filename
        );
        let content = Self::extract_pdf_with_timeout(filename, data)?;
        let content = normalize_extracted_text(&content);

        if content.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "no text content could be extracted (image-based or encrypted PDF?)",
            ));
        }

        // Page boundaries are unknown in the single-stream path; total_pages
        // stays None so nothing downstream fabricates a page number
        let pages = vec![PageContent {
            page_number: 1,
            content: content.clone(),
            char_offset: 0,
        }];

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
            pages,
        })
    }

    /// Extract text page by page through lopdf, preserving page numbers.
    /// Returns None when the document cannot be loaded or yields no text.
    fn parse_pdf_per_page(filename: &str, data: &[u8]) -> Option<ParsedDocument> {
        let doc = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("lopdf could not load {}: {}", filename, e);
                return None;
            }
        };

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let total_pages = page_numbers.len() as u32;
        let mut pages = Vec::new();
        let mut content = String::new();

        for page_num in page_numbers {
            let text = match doc.extract_text(&[page_num]) {
                Ok(text) => normalize_extracted_text(&text),
                Err(e) => {
                    tracing::debug!("no text on page {} of {}: {}", page_num, filename, e);
                    continue;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            pages.push(PageContent {
                page_number: page_num,
                content: text.clone(),
                char_offset: content.len(),
            });
            content.push_str(&text);
            content.push('\n');
        }

        if pages.is_empty() {
            return None;
        }

        Some(ParsedDocument {
            file_type: FileType::Pdf,
            content_hash: hash_content(&content),
            content,
            total_pages: Some(total_pages),
            pages,
        })
    }

    /// Extract PDF text on a worker thread with a watchdog timeout.
    /// pdf-extract can hang on PDFs with pathological font tables.
    fn extract_pdf_with_timeout(filename: &str, data: &[u8]) -> Result<String> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(60)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::file_parse(
                filename,
                format!("PDF text extraction failed: {e}"),
            )),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::file_parse(
                filename,
                "PDF extraction timed out after 60s",
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::file_parse(
                filename,
                "PDF extraction thread crashed",
            )),
        }
    }

    /// Parse a DOCX document by walking its paragraph runs
    fn parse_docx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut content = String::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                content.push_str(&t.text);
                            }
                        }
                    }
                }
                content.push('\n');
            }
        }

        if content.trim().is_empty() {
            return Err(Error::file_parse(filename, "no text content in DOCX"));
        }

        let pages = vec![PageContent {
            page_number: 1,
            content: content.clone(),
            char_offset: 0,
        }];

        Ok(ParsedDocument {
            file_type: FileType::Docx,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
            pages,
        })
    }

    /// Parse plain text or markdown
    fn parse_text(data: &[u8], file_type: FileType) -> Result<ParsedDocument> {
        let content = String::from_utf8_lossy(data).to_string();

        let pages = vec![PageContent {
            page_number: 1,
            content: content.clone(),
            char_offset: 0,
        }];

        Ok(ParsedDocument {
            file_type,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
            pages,
        })
    }
}

/// Normalize text coming out of PDF extraction: fold ligatures and curly
/// punctuation to ASCII, drop null bytes and blank-line noise.
fn normalize_extracted_text(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2010}' | '\u{2011}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect();

    let folded = folded
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace('\u{2026}', "...");

    folded
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// SHA-256 hex digest of content
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
