//! Conversational retrieval over session indexes

use std::sync::Arc;
use std::time::Instant;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::index::{IndexManager, ScoredChunk};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::types::{ChatAnswer, ChatQuery, ChatTurn, SessionId, SourceRef};

/// Answer returned when retrieval finds nothing relevant
const NO_ANSWER: &str = "This information is not available in the provided documents.";

const SNIPPET_CHARS: usize = 200;

/// Retrieval-augmented question answering over a session's index
pub struct ConversationalRag {
    manager: Arc<IndexManager>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
    similarity_threshold: f32,
}

impl ConversationalRag {
    /// Create a retrieval engine over the given backends
    pub fn new(
        manager: Arc<IndexManager>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            manager,
            embedder,
            llm,
            top_k: config.top_k,
            similarity_threshold: config.similarity_threshold,
        }
    }

    /// Answer a question against the session's index.
    ///
    /// With prior turns the question is first rewritten into a standalone
    /// form, so follow-ups like "what about the second one?" retrieve well.
    /// When no chunk clears the similarity threshold a fixed refusal is
    /// returned without calling the model.
    pub async fn invoke(&self, query: &ChatQuery, history: &[ChatTurn]) -> Result<ChatAnswer> {
        let started = Instant::now();

        let k = query.k.unwrap_or(self.top_k);
        let session_id = query
            .session_id
            .as_deref()
            .map(SessionId::parse)
            .transpose()?;
        let index = self
            .manager
            .load(session_id.as_ref(), query.use_session_dirs)?;

        let question = if history.is_empty() {
            query.question.clone()
        } else {
            let prompt = PromptBuilder::build_contextualize_prompt(&query.question, history);
            let rewritten = self.llm.complete(&prompt).await?;
            let rewritten = rewritten.trim();
            if rewritten.is_empty() {
                query.question.clone()
            } else {
                tracing::debug!("Contextualized question: {}", rewritten);
                rewritten.to_string()
            }
        };

        let query_embedding = self.embedder.embed(&question).await?;
        let results = index.search(&query_embedding, k, self.similarity_threshold)?;

        let answer = if results.is_empty() {
            tracing::info!("No chunks above threshold for question");
            NO_ANSWER.to_string()
        } else {
            let context = PromptBuilder::build_context(&results);
            let prompt = PromptBuilder::build_answer_prompt(&question, &context);
            self.llm.complete(&prompt).await?
        };

        Ok(ChatAnswer {
            answer: answer.trim().to_string(),
            session_id: session_id.map(|s| s.as_str().to_string()),
            k,
            engine: format!("{}/{}", self.llm.name(), self.llm.model()),
            sources: results.iter().map(source_ref).collect(),
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}

fn source_ref(result: &ScoredChunk) -> SourceRef {
    let mut snippet = result.chunk.content.clone();
    if snippet.len() > SNIPPET_CHARS {
        let mut end = SNIPPET_CHARS;
        while end > 0 && !snippet.is_char_boundary(end) {
            end -= 1;
        }
        snippet.truncate(end);
        snippet.push_str("...");
    }
    SourceRef {
        filename: result.chunk.source.filename.clone(),
        page_number: result.chunk.source.page_number,
        similarity: result.similarity,
        snippet,
    }
}
