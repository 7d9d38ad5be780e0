//! LLM provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM text completion
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt into answer text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
