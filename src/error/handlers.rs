//! Error handlers
//!
//! Logs errors at the transport boundary and maps them to HTTP-style
//! status codes. The core never sees these codes.

use crate::error::types::{StorageError, TransportError};
use log::{error, warn};

/// Log a transport error at a level matching its cause
pub fn handle_error(err: &TransportError) {
    match error_to_status(err) {
        500..=599 => error!("Request failed: {}", err),
        _ => warn!("Request rejected: {}", err),
    }
}

/// Convert error to a status code
pub fn error_to_status(err: &TransportError) -> u16 {
    match err {
        TransportError::InvalidParams(_) => 400,
        TransportError::Storage(e) => storage_error_to_status(e),
    }
}

/// Convert a core error to a status code
pub fn storage_error_to_status(err: &StorageError) -> u16 {
    match err {
        StorageError::NotFound(_) => 404,
        StorageError::DeleteVerification(_) => 404,
        StorageError::PathEscape(_) => 400,
        StorageError::HashMismatch { .. } => 400,
        StorageError::UnsupportedAlgorithm(_) => 400,
        StorageError::InvalidRoot { .. } => 500,
        StorageError::Io(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            error_to_status(&TransportError::InvalidParams("hash".into())),
            400
        );
        assert_eq!(
            storage_error_to_status(&StorageError::NotFound("x".into())),
            404
        );
        assert_eq!(
            storage_error_to_status(&StorageError::PathEscape("../x".into())),
            400
        );
        assert_eq!(
            storage_error_to_status(&StorageError::Io(io::Error::other("disk full"))),
            500
        );
    }
}
