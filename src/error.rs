//! Error types for gzkv
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using GzkvError
pub type Result<T> = std::result::Result<T, GzkvError>;

/// Unified error type for gzkv operations
#[derive(Debug, Error)]
pub enum GzkvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Empty payload: {0}")]
    EmptyPayload(String),

    // -------------------------------------------------------------------------
    // Archive Errors
    // -------------------------------------------------------------------------
    #[error("Failed to load archive '{}': {source}", path.display())]
    ArchiveLoadFailed {
        path: PathBuf,
        #[source]
        source: Box<GzkvError>,
    },

    #[error("Failed to open store at '{}': {reason}", path.display())]
    StoreOpenFailed { path: PathBuf, reason: String },

    #[error("Failed to write archive to {target}: {source}")]
    WriteFailed {
        target: String,
        #[source]
        source: Box<GzkvError>,
    },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("No such partition: '{0}'")]
    NoSuchPartition(String),

    #[error("Partition already exists: '{0}'")]
    BucketExists(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Timed out after {0:?} waiting for the store lock")]
    LockTimeout(Duration),

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Fetch / Cache Errors
    // -------------------------------------------------------------------------
    #[error("Request to '{url}' timed out after {after:?}")]
    RequestTimeout { url: String, after: Duration },

    #[error("Request to '{url}' failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Encode failed: {0}")]
    EncodeFailed(String),

    #[error("Decode failed: {0}")]
    DecodeFailed(String),
}

impl GzkvError {
    /// Wrap an error as a write failure against `target`.
    pub(crate) fn write_failed(target: impl Into<String>, source: GzkvError) -> Self {
        GzkvError::WriteFailed {
            target: target.into(),
            source: Box::new(source),
        }
    }

    /// Innermost cause, following `ArchiveLoadFailed` and `WriteFailed` wrappers.
    pub fn root_cause(&self) -> &GzkvError {
        match self {
            GzkvError::ArchiveLoadFailed { source, .. } | GzkvError::WriteFailed { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
