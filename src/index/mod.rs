//! Session-scoped vector indexes

mod manager;
mod session_index;

pub use manager::IndexManager;
pub use session_index::{ScoredChunk, SessionIndex};
