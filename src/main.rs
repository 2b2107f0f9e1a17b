//! Parecer server - Gemini-backed generation of legal reports for administrative processes.

mod config;
mod error;
mod gemini;
mod handlers;
mod knowledge;
mod pdf;
mod prompt;
mod upload;

#[cfg(test)]
mod test_support;

use anyhow::Context;
use config::AppConfig;
use gemini::GeminiClient;
use handlers::AppState;
use pdf::PdfTextExtractor;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "parecer_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    match knowledge::list_knowledge_files(&config.knowledge_dir) {
        Ok(files) => info!(
            "Knowledge directory {:?}: {} documents",
            config.knowledge_dir,
            files.len()
        ),
        Err(e) => warn!("{}; document requests will fail until it is readable", e),
    }

    let gemini = GeminiClient::from_config(&config)?;
    info!("Gemini client initialized: model={}", gemini.model());

    let state = AppState {
        generator: Arc::new(gemini),
        extractor: Arc::new(PdfTextExtractor),
        knowledge_dir: Arc::new(config.knowledge_dir.clone()),
        max_prompt_chars: config.max_prompt_chars,
    };

    let app = handlers::router(state, config.max_upload_bytes);

    // Run server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
