//! Provider abstractions for embeddings and LLM completion
//!
//! The hosted services are opaque: the portal only needs
//! `embed(texts) -> vectors` and `complete(prompt) -> text`. Both traits are
//! object-safe so the server state can hold `Arc<dyn ...>` and tests can
//! substitute stubs.

pub mod embedding;
pub mod llm;
pub mod openai;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use openai::{OpenAiClient, OpenAiEmbedder, OpenAiLlm};
