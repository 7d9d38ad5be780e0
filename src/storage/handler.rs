//! Saving uploads and reading their text back

use std::path::{Path, PathBuf};

use super::SessionStore;
use crate::error::{Error, Result};
use crate::ingestion::{FileParser, ParsedDocument};
use crate::types::{FileType, SessionId};

/// Persists uploaded files into a session directory and extracts their text
#[derive(Debug, Clone)]
pub struct DocumentHandler {
    store: SessionStore,
}

impl DocumentHandler {
    /// Create a handler over a session store
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Save an upload into the session's directory.
    ///
    /// The client-supplied filename is reduced to its basename and the
    /// extension validated before anything touches the disk. A re-upload of
    /// the same filename within a session overwrites the previous file.
    pub fn save_upload(&self, session: &SessionId, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let name = sanitize_filename(filename)?;
        if data.is_empty() {
            return Err(Error::BadRequest(format!("uploaded file {name} is empty")));
        }

        let dir = self.store.ensure_session_dir(session)?;
        let path = dir.join(&name);
        std::fs::write(&path, data)?;
        tracing::info!(
            "Saved upload {} ({} bytes) to session {}",
            name,
            data.len(),
            session
        );
        Ok(path)
    }

    /// Parse a previously saved file back into text
    pub fn read_document(&self, path: &Path) -> Result<ParsedDocument> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Internal(format!("invalid path {}", path.display())))?;
        let data = std::fs::read(path)?;
        FileParser::parse(filename, &data)
    }
}

/// Reduce a client filename to a safe basename with a supported extension
fn sanitize_filename(raw: &str) -> Result<String> {
    // Strip any client-side path components (both separators)
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim();

    if base.is_empty() || base.starts_with('.') {
        return Err(Error::BadRequest(format!("invalid filename: {raw:?}")));
    }
    if base.contains("..") {
        return Err(Error::BadRequest(format!("invalid filename: {raw:?}")));
    }
    if !FileType::from_filename(base).is_supported() {
        return Err(Error::UnsupportedFileType(base.to_string()));
    }
    Ok(base.to_string())
}
