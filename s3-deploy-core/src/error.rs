//! Error taxonomy for a deploy run.
//!
//! Every failure surfaces to the caller as a single terminal [`DeployError`].
//! Nothing in the core retries; retry policy belongs to the storage/CDN client.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by the storage and CDN collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum DeployError {
    /// An include/exclude rule could not be evaluated (e.g. a pattern that is not a valid regex).
    #[error("Invalid include / exclude rule: {0}")]
    InvalidRule(String),

    /// The root directory is missing or could not be traversed.
    #[error("Cannot read directory {} or doesn't exist", path.display())]
    DirectoryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A discovered file name is not valid UTF-8 and cannot become an object key.
    #[error("File name is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("Failed to read file {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage client rejected one file.
    #[error("Upload failed for {file}: {source}")]
    Upload {
        file: String,
        #[source]
        source: BoxError,
    },

    /// Uploads are done but the CDN invalidation request failed; cached content may be stale.
    #[error("Uploads succeeded but invalidation of distribution {distribution_id} failed: {source}")]
    Invalidation {
        distribution_id: String,
        #[source]
        source: BoxError,
    },

    /// An upload task panicked or was cancelled by the runtime.
    #[error("Upload task failed: {0}")]
    Task(String),
}

impl DeployError {
    /// True for errors raised before any file was read or uploaded.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DeployError::InvalidRule(_))
    }
}
