use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which text extraction backend the ingestion pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    /// Remote Apache Tika server at `TIKA_URL`.
    Tika,
    /// In-process extraction with `pdf-extract`.
    Local,
}

impl FromStr for ExtractorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tika" => Ok(ExtractorKind::Tika),
            "local" => Ok(ExtractorKind::Local),
            other => bail!("TEXT_EXTRACTOR must be 'tika' or 'local', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub tika_url: String,
    pub llm_url: String,
    pub llm_key: String,
    pub llm_model: String,
    pub resume_dir: PathBuf,
    pub text_extractor: ExtractorKind,
    /// Upper bound on in-flight extraction + LLM calls across all uploads.
    pub ingest_concurrency: usize,
    pub max_upload_bytes: usize,
    pub extraction_timeout: Option<Duration>,
    pub llm_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let ingest_concurrency = optional("INGEST_CONCURRENCY", "4")
            .parse::<usize>()
            .context("INGEST_CONCURRENCY must be a positive integer")?;
        if ingest_concurrency == 0 {
            bail!("INGEST_CONCURRENCY must be at least 1");
        }

        let max_upload_mb = optional("MAX_UPLOAD_MB", "50")
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a number of megabytes")?;

        let extraction_timeout = lookup("EXTRACTION_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("EXTRACTION_TIMEOUT_SECS must be a number of seconds")?
            .map(Duration::from_secs);

        let llm_timeout = optional("LLM_TIMEOUT_SECS", "120")
            .parse::<u64>()
            .map(Duration::from_secs)
            .context("LLM_TIMEOUT_SECS must be a number of seconds")?;

        Ok(Config {
            database_url: optional("DATABASE_URL", "sqlite://talents.db"),
            tika_url: require("TIKA_URL")?,
            llm_url: require("LLM_URL")?,
            llm_key: require("LLM_KEY")?,
            llm_model: require("LLM_MODEL")?,
            resume_dir: PathBuf::from(optional("RESUME_DIR", "resumes")),
            text_extractor: optional("TEXT_EXTRACTOR", "tika").parse()?,
            ingest_concurrency,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            extraction_timeout,
            llm_timeout,
            port: optional("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG", "info"),
        })
    }
}
