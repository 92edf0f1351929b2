use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::ingest::{BatchReport, IngestOutcome, UploadedFile};
use crate::state::AppState;

/// Reads every file field named one of `names`; other fields are skipped.
async fn collect_files(
    multipart: &mut Multipart,
    names: &[&str],
) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let wanted = field.name().is_some_and(|name| names.contains(&name));
        if !wanted {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        files.push(UploadedFile { filename, bytes });
    }
    Ok(files)
}

/// POST /talent/upload-resume
///
/// 201 with the new candidate, or 200 when the same file was ingested before.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BatchReport>), AppError> {
    let upload = collect_files(&mut multipart, &["resume"])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;

    let filename = upload.filename.clone();
    let outcome = state.ingestor.ingest(upload).await?;
    let (status, message) = match outcome {
        IngestOutcome::Created(_) => (StatusCode::CREATED, "Resume processed successfully"),
        IngestOutcome::Duplicate(_) => (StatusCode::OK, "Resume already exists"),
    };
    Ok((
        status,
        Json(BatchReport::from_outcomes(message, [(filename, Ok(outcome))])),
    ))
}

/// POST /talent/upload-resumes
///
/// Per-file failures are reported in the body; the batch itself always succeeds.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchReport>, AppError> {
    let uploads = collect_files(&mut multipart, &["resumes[]", "resumes"]).await?;
    if uploads.is_empty() {
        return Err(AppError::Validation("No resume files provided".to_string()));
    }
    Ok(Json(state.ingestor.ingest_batch(uploads).await))
}
