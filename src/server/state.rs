//! Application state for the portal server

use std::sync::Arc;

use crate::analysis::DocumentAnalyzer;
use crate::compare::DocumentComparator;
use crate::config::PortalConfig;
use crate::error::Result;
use crate::index::IndexManager;
use crate::ingestion::ChatIngestor;
use crate::providers::{EmbeddingProvider, LlmProvider, OpenAiEmbedder, OpenAiLlm};
use crate::retrieval::ConversationalRag;
use crate::storage::{DocumentHandler, SessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: PortalConfig,
    /// Upload storage
    handler: DocumentHandler,
    /// Session directory layout
    sessions: SessionStore,
    /// Index directory resolution and per-session locks
    manager: Arc<IndexManager>,
    /// Index builder
    ingestor: ChatIngestor,
    /// Conversational retrieval engine
    rag: ConversationalRag,
    /// Metadata analyzer
    analyzer: DocumentAnalyzer,
    /// Pairwise comparator
    comparator: DocumentComparator,
}

impl AppState {
    /// Create state with providers built from configuration
    pub fn new(config: PortalConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbedder::new(&config.embeddings)?);
        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiLlm::new(&config.llm)?);
        Self::with_providers(config, embedder, llm)
    }

    /// Create state with injected providers (tests use stubs here)
    pub fn with_providers(
        config: PortalConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        let store = SessionStore::new(&config.storage);
        let handler = DocumentHandler::new(store.clone());
        let manager = Arc::new(IndexManager::new(&config.storage));

        let ingestor = ChatIngestor::new(
            handler.clone(),
            manager.clone(),
            embedder.clone(),
            &config.chunking,
        );
        let rag = ConversationalRag::new(manager.clone(), embedder, llm.clone(), &config.retrieval);
        let analyzer = DocumentAnalyzer::new(llm.clone(), &config.llm);
        let comparator = DocumentComparator::new(llm, &config.llm);

        tracing::info!(
            "Portal state initialized (uploads: {}, indexes: {})",
            config.storage.upload_base.display(),
            config.storage.index_base.display()
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                handler,
                sessions: store,
                manager,
                ingestor,
                rag,
                analyzer,
                comparator,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get the upload handler
    pub fn handler(&self) -> &DocumentHandler {
        &self.inner.handler
    }

    /// Get the session store
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get the index manager
    pub fn index_manager(&self) -> &Arc<IndexManager> {
        &self.inner.manager
    }

    /// Get the index builder
    pub fn ingestor(&self) -> &ChatIngestor {
        &self.inner.ingestor
    }

    /// Get the retrieval engine
    pub fn rag(&self) -> &ConversationalRag {
        &self.inner.rag
    }

    /// Get the analyzer
    pub fn analyzer(&self) -> &DocumentAnalyzer {
        &self.inner.analyzer
    }

    /// Get the comparator
    pub fn comparator(&self) -> &DocumentComparator {
        &self.inner.comparator
    }
}
