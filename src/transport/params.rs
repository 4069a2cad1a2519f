//! Upload parameters

use crate::error::TransportError;

/// Parameters accompanying an upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadParams {
    pub file_id: String,
    /// Expected digest, lowercase hex
    pub hash: Option<String>,
    /// Algorithm name for `hash`
    pub algorithm: Option<String>,
    pub background: bool,
}

impl UploadParams {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            ..Self::default()
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>, algorithm: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self.algorithm = Some(algorithm.into());
        self
    }

    pub fn in_background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Hash and algorithm must be given together or not at all. Empty
    /// strings count as absent.
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.file_id.is_empty() {
            return Err(TransportError::InvalidParams(
                "file id cannot be empty".into(),
            ));
        }

        if present(&self.hash) != present(&self.algorithm) {
            return Err(TransportError::InvalidParams(
                "Both 'hash' and 'algorithm' must be provided together or both omitted.".into(),
            ));
        }

        Ok(())
    }

    /// Expected digest and algorithm, when a verified upload was requested
    pub fn hash_check(&self) -> Option<(&str, &str)> {
        match (self.hash.as_deref(), self.algorithm.as_deref()) {
            (Some(hash), Some(algorithm)) if !hash.is_empty() && !algorithm.is_empty() => {
                Some((hash, algorithm))
            }
            _ => None,
        }
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}
