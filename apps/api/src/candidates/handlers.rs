use std::path::Path as FsPath;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::candidates::models::{Candidate, CandidatePatch};
use crate::candidates::rescoring::{rescore_all, RescoreReport};
use crate::candidates::store;
use crate::errors::AppError;
use crate::state::AppState;

pub const MAX_INTERVIEW_RECORD_CHARS: usize = 10_000;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecordRequest {
    pub interview_record: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct TalentResponse {
    pub message: String,
    pub talent: Candidate,
}

fn check_interview_record(record: &str) -> Result<(), AppError> {
    if record.chars().count() > MAX_INTERVIEW_RECORD_CHARS {
        return Err(AppError::Validation(format!(
            "Interview record must be at most {MAX_INTERVIEW_RECORD_CHARS} characters"
        )));
    }
    Ok(())
}

async fn load(state: &AppState, phone: i64) -> Result<Candidate, AppError> {
    store::get(&state.db, phone)
        .await?
        .ok_or_else(|| AppError::NotFound("Talent not found".to_string()))
}

/// POST /talent
pub async fn handle_create_talent(
    State(state): State<AppState>,
    Json(mut candidate): Json<Candidate>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    if candidate.phone <= 0 {
        return Err(AppError::Validation("phone is required".to_string()));
    }
    check_interview_record(&candidate.interview_record)?;

    // Only ingestion sets these.
    candidate.hash.clear();
    candidate.resume_path.clear();
    candidate.rescore(&state.universities);
    match store::insert(&state.db, &candidate).await {
        Ok(()) => {}
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            return Err(AppError::Conflict(format!(
                "Talent with phone {} already exists",
                candidate.phone
            )));
        }
        Err(e) => return Err(e.into()),
    }

    info!(phone = candidate.phone, "talent created");
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /talent/:id
pub async fn handle_get_talent(
    State(state): State<AppState>,
    Path(phone): Path<i64>,
) -> Result<Json<Candidate>, AppError> {
    Ok(Json(load(&state, phone).await?))
}

/// PUT /talent/:id
pub async fn handle_update_talent(
    State(state): State<AppState>,
    Path(phone): Path<i64>,
    Json(patch): Json<CandidatePatch>,
) -> Result<Json<Candidate>, AppError> {
    let mut candidate = load(&state, phone).await?;
    patch.apply_to(&mut candidate);
    check_interview_record(&candidate.interview_record)?;
    candidate.rescore(&state.universities);

    if !store::update(&state.db, &candidate).await? {
        return Err(AppError::NotFound("Talent not found".to_string()));
    }
    info!(phone, "talent updated");
    Ok(Json(candidate))
}

/// DELETE /talent/:id
pub async fn handle_delete_talent(
    State(state): State<AppState>,
    Path(phone): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !store::delete(&state.db, phone).await? {
        return Err(AppError::NotFound("Talent not found".to_string()));
    }
    info!(phone, "talent deleted");
    Ok(Json(MessageResponse {
        message: "Talent deleted successfully".to_string(),
    }))
}

/// GET /talents?query=
pub async fn handle_search_talents(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    Ok(Json(store::search(&state.db, params.query.trim()).await?))
}

/// POST /talents/recalculate-scores
pub async fn handle_recalculate_scores(
    State(state): State<AppState>,
) -> Result<Json<RescoreReport>, AppError> {
    Ok(Json(rescore_all(&state.db, &state.universities).await?))
}

/// POST /talent/:id/interview-record
pub async fn handle_update_interview_record(
    State(state): State<AppState>,
    Path(phone): Path<i64>,
    Json(req): Json<InterviewRecordRequest>,
) -> Result<Json<TalentResponse>, AppError> {
    check_interview_record(&req.interview_record)?;
    if !store::update_interview_record(&state.db, phone, &req.interview_record).await? {
        return Err(AppError::NotFound("Talent not found".to_string()));
    }
    Ok(Json(TalentResponse {
        message: "Interview record updated".to_string(),
        talent: load(&state, phone).await?,
    }))
}

/// GET /resume/:phone — 302 to the stored file under `/resumes/`.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(phone): Path<i64>,
) -> Result<Response, AppError> {
    let candidate = load(&state, phone).await?;
    let file_name = FsPath::new(&candidate.resume_path)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AppError::NotFound("No resume available for this talent".to_string()))?;

    let location = format!("/resumes/{}", encode_path_segment(file_name));
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Percent-encodes everything outside the URL unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}
