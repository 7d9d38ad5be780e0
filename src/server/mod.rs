//! HTTP server for the document portal

pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::PortalConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Document portal HTTP server
pub struct PortalServer {
    config: PortalConfig,
    state: AppState,
}

impl PortalServer {
    /// Create a server with providers built from configuration
    pub fn new(config: PortalConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Create a server around prepared state (tests inject stub providers)
    pub fn with_state(config: PortalConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes and middleware
    pub fn build_router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Start serving
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {e}")))?;

        let router = self.build_router();

        tracing::info!("Starting document portal on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {addr}: {e}")))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

        Ok(())
    }
}

/// Build the portal router over prepared state
pub fn build_router(state: AppState, config: &PortalConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(routes::analyze::analyze_document))
        .route("/compare", post(routes::compare::compare_documents))
        .route("/chat/index", post(routes::chat::build_index))
        .route("/chat/query", post(routes::chat::query))
        .route("/sessions", get(routes::sessions::list_sessions))
        .route("/sessions/:id", delete(routes::sessions::delete_session))
        .layer(DefaultBodyLimit::max(config.server.max_upload_size))
        .with_state(state)
        // Middleware layers (order matters, applied bottom to top)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if config.server.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "document-portal",
    }))
}
