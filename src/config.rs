//! Configuration for the document portal

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main portal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Upload/index storage layout
    pub storage: StorageConfig,
    /// Embedding provider configuration
    pub embeddings: EmbeddingConfig,
    /// Text chunking configuration
    pub chunking: ChunkingConfig,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

impl PortalConfig {
    /// Load configuration from a TOML file.
    ///
    /// Resolution order: explicit path argument, `PORTAL_CONFIG` env var,
    /// `portal.toml` in the working directory, then compiled defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => match std::env::var("PORTAL_CONFIG") {
                Ok(p) => Some(PathBuf::from(p)),
                Err(_) => {
                    let default = PathBuf::from("portal.toml");
                    default.exists().then_some(default)
                }
            },
        };

        match path {
            Some(p) => {
                let content = std::fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("Cannot read config {}: {}", p.display(), e))
                })?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Invalid config {}: {}", p.display(), e)))
            }
            None => Ok(Self::default()),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable permissive CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Storage layout for uploads and indexes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for uploaded files
    pub upload_base: PathBuf,
    /// Base directory for vector indexes
    pub index_base: PathBuf,
    /// Index file name within a session's index directory (without extension)
    pub index_name: String,
    /// Scope uploads and indexes per session by default
    pub use_session_dirs: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_base: PathBuf::from("data"),
            index_base: PathBuf::from("index"),
            index_name: "index".to_string(),
            use_session_dirs: true,
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider base URL (any OpenAI-compatible embeddings endpoint)
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Embedding dimensions (1536 for text-embedding-3-small)
    pub dimensions: usize,
    /// Batch size for embedding requests
    pub batch_size: usize,
    /// Env var holding the API key
    pub api_key_env: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 64,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size (smaller fragments are dropped)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 50,
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider base URL (any OpenAI-compatible chat endpoint; Groq works too)
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for transient failures
    pub max_retries: u32,
    /// Env var holding the API key
    pub api_key_env: String,
    /// Maximum document characters passed to analysis/comparison prompts
    pub max_analysis_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 2048,
            timeout_secs: 120,
            max_retries: 2,
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_analysis_chars: 60_000,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Default number of chunks to retrieve
    pub top_k: usize,
    /// Minimum similarity for a chunk to be used (0.0-1.0)
    pub similarity_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.2,
        }
    }
}
