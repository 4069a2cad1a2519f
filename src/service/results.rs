//! File service result types

use crate::storage::stream::ByteStream;

/// A download in progress
///
/// The stream must be consumed or dropped; the underlying file handle is
/// released when the stream is exhausted or dropped.
pub struct FileDownload {
    /// Identifier the blob was requested under, used as the filename label
    pub identifier: String,
    pub stream: ByteStream,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// How a background save left the caller
///
/// Neither variant says whether the save succeeded: failures inside the
/// background task are logged and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundSave {
    /// The task ended within the grace period
    Finished,
    /// The grace period elapsed; the task keeps running unobserved
    Detached,
}
