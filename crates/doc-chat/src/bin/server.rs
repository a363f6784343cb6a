//! DocChat server binary
//!
//! Run with: cargo run -p doc-chat --bin doc-chat-server

use doc_chat::{config::DocChatConfig, server::DocChatServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_chat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         DocChat                           ║
║             Ask questions about an uploaded PDF           ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config_path = std::env::var_os("DOC_CHAT_CONFIG").map(PathBuf::from);
    let config = DocChatConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Passage size: {} chars", config.chunking.max_chars);
    tracing::info!("  - Passages per answer: {}", config.retrieval.top_k);

    if config.llm.api_key.is_empty() {
        tracing::warn!("No Gemini API key configured");
        tracing::warn!("  Set GEMINI_API_KEY or llm.api_key in the config file");
    }

    let server = DocChatServer::new(config).await?;

    // Check Gemini
    let llm = server.state().pipeline().llm();
    tracing::info!("Checking {} ({})...", llm.name(), llm.model());
    match llm.health_check().await {
        Ok(true) => tracing::info!("Gemini is reachable"),
        _ => tracing::warn!("Gemini not reachable; /ask will fail until it is"),
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /upload  - Upload a PDF (multipart field 'file')");
    println!("  POST /ask     - Ask a question (form field 'q')");
    println!("  GET  /status  - Current document");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
