pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::candidates::handlers as candidates;
use crate::ingest::handlers as ingest;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let resumes = ServeDir::new(&state.config.resume_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Candidates
        .route("/talent", post(candidates::handle_create_talent))
        .route(
            "/talent/:id",
            get(candidates::handle_get_talent)
                .put(candidates::handle_update_talent)
                .delete(candidates::handle_delete_talent),
        )
        .route("/talents", get(candidates::handle_search_talents))
        .route(
            "/talents/recalculate-scores",
            post(candidates::handle_recalculate_scores),
        )
        .route(
            "/talent/:id/interview-record",
            post(candidates::handle_update_interview_record),
        )
        .route("/resume/:phone", get(candidates::handle_get_resume))
        // Ingestion
        .route("/talent/upload-resume", post(ingest::handle_upload_resume))
        .route("/talent/upload-resumes", post(ingest::handle_upload_resumes))
        .nest_service("/resumes", resumes)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
