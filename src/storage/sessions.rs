//! Session directory layout under the upload base

use std::path::PathBuf;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::types::SessionId;

/// Resolves and manages per-session upload directories
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Base directory for uploads
    base: PathBuf,
}

impl SessionStore {
    /// Create a store from storage configuration
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base: config.upload_base.clone(),
        }
    }

    /// Directory holding one session's uploads (not created yet)
    pub fn session_dir(&self, session: &SessionId) -> PathBuf {
        self.base.join(session.as_str())
    }

    /// Create (if needed) and return a session's upload directory
    pub fn ensure_session_dir(&self, session: &SessionId) -> Result<PathBuf> {
        let dir = self.session_dir(session);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// List known session ids, newest first by directory name
    pub fn list_sessions(&self) -> Result<Vec<SessionId>> {
        let mut sessions = Vec::new();
        if !self.base.exists() {
            return Ok(sessions);
        }
        for entry in std::fs::read_dir(&self.base)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Ok(id) = SessionId::parse(name) {
                        sessions.push(id);
                    }
                }
            }
        }
        sessions.sort_by(|a, b| b.as_str().cmp(a.as_str()));
        Ok(sessions)
    }

    /// Delete a session's uploads
    pub fn delete_session(&self, session: &SessionId) -> Result<()> {
        let dir = self.session_dir(session);
        if !dir.exists() {
            return Err(Error::SessionNotFound(session.to_string()));
        }
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
