//! Index directory resolution and per-session access serialization

use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::index::SessionIndex;
use crate::types::SessionId;

/// Resolves session index paths and serializes concurrent index writes
pub struct IndexManager {
    /// Base directory for all indexes
    base: PathBuf,
    /// Index file name (without extension)
    index_name: String,
    /// One lock per index directory; ingestion rewrites the file whole
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl IndexManager {
    /// Create a manager from storage configuration
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base: config.index_base.clone(),
            index_name: config.index_name.clone(),
            locks: DashMap::new(),
        }
    }

    /// Resolve the index directory for a request.
    ///
    /// With `use_session_dirs` a session id is mandatory; without it the
    /// shared base directory holds a single global index.
    pub fn index_dir(
        &self,
        session_id: Option<&SessionId>,
        use_session_dirs: bool,
    ) -> Result<PathBuf> {
        if use_session_dirs {
            let session = session_id.ok_or_else(|| {
                Error::BadRequest(
                    "session_id is required when use_session_dirs=true".to_string(),
                )
            })?;
            Ok(self.base.join(session.as_str()))
        } else {
            Ok(self.base.clone())
        }
    }

    /// Full path of the index file inside a resolved directory
    pub fn index_path(&self, dir: &std::path::Path) -> PathBuf {
        dir.join(format!("{}.json", self.index_name))
    }

    /// Load an existing index, failing with 404 semantics when absent
    pub fn load(&self, session_id: Option<&SessionId>, use_session_dirs: bool) -> Result<SessionIndex> {
        let dir = self.index_dir(session_id, use_session_dirs)?;
        let path = self.index_path(&dir);
        if !path.exists() {
            return Err(Error::IndexNotFound(format!(
                "no index at {}",
                dir.display()
            )));
        }
        SessionIndex::load(&path)
    }

    /// Load an index if present, otherwise start a new one
    pub fn open_or_create(
        &self,
        session_id: Option<&SessionId>,
        use_session_dirs: bool,
    ) -> Result<SessionIndex> {
        let dir = self.index_dir(session_id, use_session_dirs)?;
        let path = self.index_path(&dir);
        if path.exists() {
            SessionIndex::load(&path)
        } else {
            Ok(SessionIndex::new())
        }
    }

    /// Persist an index for a session
    pub fn save(
        &self,
        index: &SessionIndex,
        session_id: Option<&SessionId>,
        use_session_dirs: bool,
    ) -> Result<()> {
        let dir = self.index_dir(session_id, use_session_dirs)?;
        index.save(&self.index_path(&dir))
    }

    /// Lock guarding writes to one session's index
    pub fn lock_for(&self, session_id: Option<&SessionId>) -> Arc<Mutex<()>> {
        let key = session_id
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "__global__".to_string());
        self.locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Delete a session's index directory and drop its lock entry.
    /// Returns whether an index directory existed.
    pub fn delete_index(&self, session_id: &SessionId) -> Result<bool> {
        let dir = self.base.join(session_id.as_str());
        let existed = dir.exists();
        if existed {
            std::fs::remove_dir_all(&dir)?;
        }
        self.locks.remove(session_id.as_str());
        Ok(existed)
    }
}
