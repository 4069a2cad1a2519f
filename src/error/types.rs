//! Error types
//!
//! Defines the error types for each layer of the file store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for storage and service operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage layer errors
///
/// Driver errors pass through the file service unchanged, so this is also
/// the error type callers of [`crate::service::FileService`] see.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Identifier resolves outside the storage root
    #[error("Path escapes base directory: {0}")]
    PathEscape(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Verified upload produced a different digest. The blob stays stored.
    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    /// Blob was still present after a delete reported success
    #[error("File '{0}' was not deleted")]
    DeleteVerification(String),

    /// Storage root failed validation at driver construction
    #[error("Invalid storage root {}: {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Maps an I/O error to `NotFound` when the target is missing, including
    /// when a parent component is a regular file.
    pub(crate) fn from_io(id: &str, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
                StorageError::NotFound(id.to_string())
            }
            _ => StorageError::Io(error),
        }
    }
}

/// Transport adapter errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Upload parameters failed validation before reaching the core
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Command line front end errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<StorageError> for CliError {
    fn from(error: StorageError) -> Self {
        CliError::Transport(TransportError::Storage(error))
    }
}
