//! Session identifiers
//!
//! A session scopes one user's uploads and index under dedicated directories.
//! Because the id is used as a path component, parsing is strict: anything
//! outside `[A-Za-z0-9_-]` is rejected so a client-supplied id can never
//! escape the storage base directories.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Session identifier, e.g. `session_20250117_153012_a1b2c3d4`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh session id from the current time and a random suffix
    pub fn generate() -> Self {
        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("session_{}_{}", stamp, &suffix[..8]))
    }

    /// Parse a client-supplied session id
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(crate::Error::BadRequest("session_id is empty".to_string()));
        }
        if raw.len() > 128 {
            return Err(crate::Error::BadRequest("session_id too long".to_string()));
        }
        let valid = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(crate::Error::BadRequest(format!(
                "session_id contains invalid characters: {raw}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}
