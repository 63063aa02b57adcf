//! Error types for Lectern Core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using LecternError
pub type Result<T> = std::result::Result<T, LecternError>;

/// Top-level error type for all Lectern operations
#[derive(Debug, Error)]
pub enum LecternError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while reading the source archive
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unreadable archive: {0}")]
    UnreadableArchive(String),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("Malformed package document: {0}")]
    MalformedPackage(String),
}

/// Fatal errors of the normalization pipeline
///
/// Anything in here aborts the run; no partial book is persisted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot prepare output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write asset {path}: {source}")]
    AssetWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid source identifier: {0}")]
    InvalidIdentifier(String),
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    BackendError(String),
}
