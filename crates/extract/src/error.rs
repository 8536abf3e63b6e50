use std::path::PathBuf;

use thiserror::Error;

/// Errors from the extraction stage. All of these abort the run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("retrieval failed: {url} returned status {status}")]
    Retrieval { status: u16, url: String },

    #[error("retrieval failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("corrupt archive: {0}")]
    CorruptArchive(#[from] zip::result::ZipError),

    #[error("archive entry escapes the destination directory: {0}")]
    UnsafeEntry(String),

    #[error("malformed input at {path}: {detail}")]
    MalformedInput { path: PathBuf, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
