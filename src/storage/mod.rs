//! Filesystem storage for uploads, scoped per session

mod handler;
mod sessions;

pub use handler::DocumentHandler;
pub use sessions::SessionStore;
