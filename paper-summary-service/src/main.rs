use paper_summary_service::{
    AppState, Config, PaperProcessor, build_router, init_tracing,
    store::{InMemoryPaperStore, PaperStore, PostgresPaperStore},
    summarizer::{LlmSummarizer, OpenRouterBackend, Summarizer, TemplateSummarizer},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_format);

    tokio::fs::create_dir_all(&config.upload_folder).await?;

    let store = create_store(&config).await;
    let summarizer = create_summarizer(&config);
    let processor = PaperProcessor::new(store, summarizer);

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    let addr = listener.local_addr()?;

    let app = build_router(AppState::new(processor.clone(), config));

    info!("Paper Summary Service starting on {}", addr);
    info!("Upload endpoint: POST http://{}/api/papers/upload", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    processor.shutdown().await;
    info!("Paper Summary Service stopped");

    Ok(())
}

async fn create_store(config: &Config) -> Arc<dyn PaperStore> {
    match &config.database_url {
        Some(database_url) => {
            info!("Using PostgreSQL paper store");
            match PostgresPaperStore::connect(database_url).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    error!(
                        "Failed to connect to PostgreSQL: {}. Falling back to in-memory storage.",
                        e
                    );
                    Arc::new(InMemoryPaperStore::new())
                }
            }
        }
        None => {
            info!("Using in-memory paper store (set DATABASE_URL to use PostgreSQL)");
            Arc::new(InMemoryPaperStore::new())
        }
    }
}

fn create_summarizer(config: &Config) -> Arc<dyn Summarizer> {
    match &config.openrouter_api_key {
        Some(api_key) => {
            info!(model = %config.summary_model, "Using OpenRouter summarizer");
            let backend = OpenRouterBackend::new(api_key, &config.summary_model);
            Arc::new(LlmSummarizer::new(Arc::new(backend)))
        }
        None => {
            warn!("OPENROUTER_API_KEY not set, summaries will use the built-in template");
            Arc::new(TemplateSummarizer)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
