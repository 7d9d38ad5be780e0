//! Document portal server binary
//!
//! Run with: cargo run --bin document-portal-server

use std::path::PathBuf;

use document_portal::{config::PortalConfig, server::PortalServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "document_portal=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional config path as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PortalConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Upload dir: {}", config.storage.upload_base.display());
    tracing::info!("  - Index dir: {}", config.storage.index_base.display());

    let address = format!("{}:{}", config.server.host, config.server.port);
    let server = PortalServer::new(config)?;

    println!("\nDocument portal starting...");
    println!("  Health:  http://{address}/health");
    println!("\nEndpoints:");
    println!("  POST /analyze    - Extract document metadata");
    println!("  POST /compare    - Compare two documents page by page");
    println!("  POST /chat/index - Upload documents and build a session index");
    println!("  POST /chat/query - Ask questions against a session");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
