//! OpenAI-compatible embedding and chat-completion client
//!
//! The base URL is configurable, so any service speaking the OpenAI wire
//! format works unchanged (Groq exposes the same chat endpoint).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Low-level HTTP client for one OpenAI-compatible endpoint
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl OpenAiClient {
    /// Build a client for a base URL, reading the API key from `api_key_env`
    pub fn new(base_url: &str, api_key_env: &str, timeout_secs: u64, max_retries: u32) -> Result<Self> {
        let api_key = std::env::var(api_key_env).map_err(|_| {
            Error::Config(format!(
                "missing API key: set the {api_key_env} environment variable"
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            max_retries,
        })
    }

    /// POST a JSON body, retrying transient failures (network errors, 429,
    /// 5xx) up to `max_retries` times with linear backoff
    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                tracing::debug!("retrying {} (attempt {})", url, attempt + 1);
            }

            let response = match self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(format!("request failed: {e}"));
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response.json().await?);
            }

            let detail = response.text().await.unwrap_or_default();
            let message = format!("{} returned {}: {}", url, status, detail);
            if status.as_u16() == 429 || status.is_server_error() {
                last_error = Some(message);
                continue;
            }
            // Client errors are not retryable
            return Err(Error::Llm(message));
        }

        Err(Error::Llm(last_error.unwrap_or_else(|| {
            format!("{} failed after {} attempts", url, self.max_retries + 1)
        })))
    }

    /// Call the embeddings endpoint for a batch of inputs
    pub async fn embeddings(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingsRequest {
            model: model.to_string(),
            input: inputs.to_vec(),
        };
        let response: EmbeddingsResponse = self
            .post_json("/embeddings", &request)
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;

        let mut data = response.data;
        // The API is allowed to reorder; index restores input order
        data.sort_by_key(|d| d.index);
        if data.len() != inputs.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                data.len()
            )));
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    /// Call the chat-completions endpoint with a single user message
    pub async fn chat_completion(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature,
            max_tokens,
        };
        let response: ChatResponse = self.post_json("/chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Llm("chat completion returned no choices".to_string()))
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Embedding provider backed by an OpenAI-compatible endpoint
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAiEmbedder {
    /// Create an embedder from configuration
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = OpenAiClient::new(&config.base_url, &config.api_key_env, 60, 2)?;
        Ok(Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let result = self.client.embeddings(&self.model, &[text.to_string()]).await?;
        result
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.client.embeddings(&self.model, batch).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "openai-embeddings"
    }
}

/// LLM provider backed by an OpenAI-compatible chat endpoint
pub struct OpenAiLlm {
    client: OpenAiClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiLlm {
    /// Create an LLM provider from configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = OpenAiClient::new(
            &config.base_url,
            &config.api_key_env,
            config.timeout_secs,
            config.max_retries,
        )?;
        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.client
            .chat_completion(&self.model, prompt, self.temperature, self.max_tokens)
            .await
    }

    fn name(&self) -> &str {
        "openai-chat"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
