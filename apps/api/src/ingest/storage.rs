//! Resume files on disk: naming, claiming, hashing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// A resume written into the resume directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    /// File name inside the resume directory, as served under `/resumes/`.
    pub file_name: String,
}

/// Final path component of a client-supplied file name. Both separators are
/// honored since browsers on Windows may send a full path.
pub fn base_name(filename: &str) -> Option<&str> {
    let base = filename.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}

pub fn is_pdf(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Writes `bytes` to `<dir>/<timestamp>_<base_name>`, creating `dir` if needed.
/// A name already taken gets a numeric suffix; existing files are never overwritten.
pub async fn save(
    dir: &Path,
    base_name: &str,
    timestamp: i64,
    bytes: &[u8],
) -> std::io::Result<StoredFile> {
    fs::create_dir_all(dir).await?;

    let mut attempt = 0u32;
    let (path, file_name, mut file) = loop {
        let file_name = if attempt == 0 {
            format!("{timestamp}_{base_name}")
        } else {
            format!("{timestamp}_{attempt}_{base_name}")
        };
        let path = dir.join(&file_name);
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => break (path, file_name, file),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    };

    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;
    if let Err(e) = written {
        let _ = fs::remove_file(&path).await;
        return Err(e);
    }

    Ok(StoredFile { path, file_name })
}

/// Lowercase hex SHA-256 of the file at `path`.
pub async fn hash_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
