use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::ingest::Ingestor;
use crate::scoring::university::UniversityTable;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    /// Read-only after startup.
    pub universities: Arc<UniversityTable>,
    pub ingestor: Ingestor,
}
