mod candidates;
mod config;
mod db;
mod errors;
mod extraction;
mod ingest;
mod llm_client;
mod routes;
mod scoring;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ExtractorKind};
use crate::db::create_pool;
use crate::extraction::{CandidateExtractor, LocalPdfExtractor, TextExtractor, TikaClient};
use crate::ingest::Ingestor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scoring::university::UniversityTable;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talents API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite and apply migrations
    let db = create_pool(&config.database_url).await?;

    let universities = Arc::new(UniversityTable::embedded()?);
    info!("University table loaded ({} names)", universities.len());

    let llm = LlmClient::new(
        &config.llm_url,
        config.llm_key.clone(),
        config.llm_model.clone(),
        config.llm_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let text_extractor: Arc<dyn TextExtractor> = match config.text_extractor {
        ExtractorKind::Tika => {
            info!("Text extraction via Tika at {}", config.tika_url);
            Arc::new(TikaClient::new(
                config.tika_url.clone(),
                config.extraction_timeout,
            )?)
        }
        ExtractorKind::Local => {
            info!("Text extraction in-process");
            Arc::new(LocalPdfExtractor)
        }
    };

    let ingestor = Ingestor::new(
        db.clone(),
        config.resume_dir.clone(),
        text_extractor,
        CandidateExtractor::new(Arc::new(llm)),
        universities.clone(),
        config.ingest_concurrency,
    );

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        universities,
        ingestor,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
