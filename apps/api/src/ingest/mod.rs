//! Ingestion Pipeline — uploaded resume in, scored candidate record out.
//!
//! Per file: check extension → write to the resume directory → hash →
//! duplicate check → extract text → extract candidate → score → insert.
//! Batches run one task per file; a shared semaphore bounds how many files
//! are talking to the extraction service and the model at once.

pub mod handlers;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::candidates::models::Candidate;
use crate::candidates::store;
use crate::extraction::{CandidateExtractionError, CandidateExtractor, ExtractionError, TextExtractor};
use crate::scoring::university::UniversityTable;
use storage::StoredFile;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Only PDF files are supported")]
    NotPdf,

    #[error("Invalid file name")]
    InvalidFilename,

    #[error("Failed to save resume: {0}")]
    Storage(#[source] std::io::Error),

    #[error("Failed to calculate file hash: {0}")]
    Hash(#[source] std::io::Error),

    #[error("Failed to extract resume text: {0}")]
    TextExtraction(#[from] ExtractionError),

    #[error("Failed to parse resume: {0}")]
    CandidateExtraction(#[from] CandidateExtractionError),

    #[error("A candidate with phone {0} already exists")]
    PhoneConflict(i64),

    #[error("Failed to save talent: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Resume processing task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestSuccess {
    pub filename: String,
    pub talent: Candidate,
    pub file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestDuplicate {
    pub filename: String,
    pub existing_file: String,
    pub existing_talent: Candidate,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Created(IngestSuccess),
    Duplicate(IngestDuplicate),
}

/// Aggregated result of one or more ingestions. The three lists are disjoint
/// and together hold exactly one entry per submitted file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub message: String,
    pub total: usize,
    pub successful: usize,
    pub duplicate_count: usize,
    pub failed: usize,
    pub results: Vec<IngestSuccess>,
    pub duplicates: Vec<IngestDuplicate>,
    pub errors: Vec<IngestFailure>,
}

impl BatchReport {
    pub fn from_outcomes<I>(message: &str, outcomes: I) -> Self
    where
        I: IntoIterator<Item = (String, Result<IngestOutcome, IngestError>)>,
    {
        let mut report = BatchReport {
            message: message.to_string(),
            ..Default::default()
        };
        for (filename, outcome) in outcomes {
            report.total += 1;
            match outcome {
                Ok(IngestOutcome::Created(success)) => report.results.push(success),
                Ok(IngestOutcome::Duplicate(duplicate)) => report.duplicates.push(duplicate),
                Err(e) => report.errors.push(IngestFailure {
                    filename,
                    error: e.to_string(),
                }),
            }
        }
        report.successful = report.results.len();
        report.duplicate_count = report.duplicates.len();
        report.failed = report.errors.len();
        report
    }
}

#[derive(Clone)]
pub struct Ingestor {
    db: SqlitePool,
    resume_dir: PathBuf,
    text: Arc<dyn TextExtractor>,
    candidates: CandidateExtractor,
    universities: Arc<UniversityTable>,
    permits: Arc<Semaphore>,
}

impl Ingestor {
    pub fn new(
        db: SqlitePool,
        resume_dir: PathBuf,
        text: Arc<dyn TextExtractor>,
        candidates: CandidateExtractor,
        universities: Arc<UniversityTable>,
        concurrency: usize,
    ) -> Self {
        Self {
            db,
            resume_dir,
            text,
            candidates,
            universities,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Runs the full pipeline for one file. The stored file is removed on a
    /// duplicate and on any failure after it was written.
    pub async fn ingest(&self, upload: UploadedFile) -> Result<IngestOutcome, IngestError> {
        let base_name = storage::base_name(&upload.filename).ok_or(IngestError::InvalidFilename)?;
        if !storage::is_pdf(base_name) {
            return Err(IngestError::NotPdf);
        }

        let timestamp = chrono::Utc::now().timestamp();
        let stored = storage::save(&self.resume_dir, base_name, timestamp, &upload.bytes)
            .await
            .map_err(IngestError::Storage)?;
        debug!(filename = %upload.filename, stored_as = %stored.file_name, "resume stored");

        let outcome = self.process(&upload.filename, &stored).await;
        if !matches!(outcome, Ok(IngestOutcome::Created(_))) {
            if let Err(e) = tokio::fs::remove_file(&stored.path).await {
                warn!(path = %stored.path.display(), error = %e, "failed to remove resume file");
            }
        }

        match &outcome {
            Ok(IngestOutcome::Created(success)) => {
                info!(filename = %upload.filename, phone = success.talent.phone, "resume ingested")
            }
            Ok(IngestOutcome::Duplicate(duplicate)) => info!(
                filename = %upload.filename,
                existing_file = %duplicate.existing_file,
                "duplicate resume skipped"
            ),
            Err(e) => warn!(filename = %upload.filename, error = %e, "resume ingestion failed"),
        }
        outcome
    }

    async fn process(&self, filename: &str, stored: &StoredFile) -> Result<IngestOutcome, IngestError> {
        let hash = storage::hash_file(&stored.path)
            .await
            .map_err(IngestError::Hash)?;

        if let Some(existing) = store::find_by_hash(&self.db, &hash).await? {
            return Ok(duplicate_of(filename, existing));
        }

        let mut candidate = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|e| IngestError::Task(e.to_string()))?;
            let text = self.text.extract(&stored.path).await?;
            self.candidates.extract(&text).await?
        };
        // Phone is the record key; a phoneless resume must not claim row 0.
        if candidate.phone <= 0 {
            return Err(CandidateExtractionError::MissingPhone(candidate.phone).into());
        }

        candidate.resume_path = stored.path.to_string_lossy().into_owned();
        candidate.hash = hash;
        candidate.rescore(&self.universities);

        match store::insert(&self.db, &candidate).await {
            Ok(()) => Ok(IngestOutcome::Created(IngestSuccess {
                filename: filename.to_string(),
                file: candidate.resume_path.clone(),
                talent: candidate,
            })),
            Err(e) if is_unique_violation(&e) => {
                // Either an identical upload won the race or the phone is taken.
                match store::find_by_hash(&self.db, &candidate.hash).await? {
                    Some(existing) => Ok(duplicate_of(filename, existing)),
                    None => Err(IngestError::PhoneConflict(candidate.phone)),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Ingests every file concurrently and waits for all of them.
    pub async fn ingest_batch(&self, uploads: Vec<UploadedFile>) -> BatchReport {
        let mut set = JoinSet::new();
        for upload in uploads {
            let ingestor = self.clone();
            set.spawn(async move {
                let filename = upload.filename.clone();
                // Inner task so a panic is reported against its own file.
                let outcome = match tokio::spawn(async move { ingestor.ingest(upload).await }).await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(IngestError::Task(e.to_string())),
                };
                (filename, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) => outcomes.push(entry),
                Err(e) => outcomes.push((String::new(), Err(IngestError::Task(e.to_string())))),
            }
        }

        let report = BatchReport::from_outcomes("Batch processing completed", outcomes);
        info!(
            total = report.total,
            successful = report.successful,
            duplicates = report.duplicate_count,
            failed = report.failed,
            "batch ingestion complete"
        );
        report
    }
}

fn duplicate_of(filename: &str, existing: Candidate) -> IngestOutcome {
    IngestOutcome::Duplicate(IngestDuplicate {
        filename: filename.to_string(),
        existing_file: existing.resume_path.clone(),
        existing_talent: existing,
    })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::path::Path;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::{ChatModel, LlmError};

    /// Treats the stored file's bytes as its text; `%PDF` is not required.
    pub struct FileText;

    #[async_trait]
    impl TextExtractor for FileText {
        async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
            let text = tokio::fs::read_to_string(path).await?;
            Ok(format!("{}\n{}", path.display(), text))
        }
    }

    /// Answers with a candidate whose phone is the number after `phone:` in
    /// the resume text, and `boom` in the text makes the model fail.
    pub struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            if prompt.contains("boom") {
                return Err(LlmError::EmptyContent);
            }
            let phone: String = prompt
                .split("phone:")
                .nth(1)
                .map(|rest| rest.chars().take_while(char::is_ascii_digit).collect())
                .unwrap_or_default();
            Ok(format!(
                r#"Here you go: {{"name":"Candidate {phone}","phone":{phone},"education":"本科",
                "universities":["清华大学"],"skills":["python","vue3"],"jobPosition":"前端"}}"#
            ))
        }
    }

    pub fn ingestor(db: SqlitePool, resume_dir: PathBuf) -> Ingestor {
        ingestor_with(db, resume_dir, Arc::new(FileText), 2)
    }

    pub fn ingestor_with(
        db: SqlitePool,
        resume_dir: PathBuf,
        text: Arc<dyn TextExtractor>,
        concurrency: usize,
    ) -> Ingestor {
        Ingestor::new(
            db,
            resume_dir,
            text,
            CandidateExtractor::new(Arc::new(EchoModel)),
            Arc::new(UniversityTable::from_entries([("清华大学", 1076.1)])),
            concurrency,
        )
    }

    pub fn upload(filename: &str, body: &str) -> UploadedFile {
        UploadedFile {
            filename: filename.to_string(),
            bytes: Bytes::from(body.to_string()),
        }
    }
}
