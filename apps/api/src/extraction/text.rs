//! Text Extraction — turns a stored resume PDF into raw text.
//!
//! `TikaClient` ships the bytes to a Tika server; `LocalPdfExtractor` does the
//! same in-process. Both prefix the output with the source path.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read resume file: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("extraction service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("PDF extraction error: {0}")]
    Pdf(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns `"<path>\n<text>"` for the PDF at `path`.
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Client for a Tika-style `PUT` endpoint (`application/pdf` in, `text/plain` out).
#[derive(Clone)]
pub struct TikaClient {
    client: Client,
    url: String,
}

impl TikaClient {
    /// No request timeout unless one is given.
    pub fn new(url: String, timeout: Option<Duration>) -> Result<Self, ExtractionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url,
        })
    }
}

#[async_trait]
impl TextExtractor for TikaClient {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;

        let response = self
            .client
            .put(&self.url)
            .header(CONTENT_TYPE, "application/pdf")
            .header(ACCEPT, "text/plain")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(path = %path.display(), chars = body.len(), "Tika extraction complete");
        Ok(format!("{}\n{}", path.display(), body))
    }
}

/// In-process extraction with `pdf-extract`, run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPdfExtractor;

#[async_trait]
impl TextExtractor for LocalPdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;

        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractionError::Pdf(format!("extraction task failed: {e}")))?
            .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        Ok(format!("{}\n{}", path.display(), text))
    }
}
