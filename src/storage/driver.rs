//! Storage driver contract
//!
//! Every backend implements the same six operations. Identifiers are
//! confined by the path sandbox before any backend I/O happens.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::StorageResult;
use crate::storage::local::LocalDriver;
use crate::storage::memory::MemoryDriver;
use crate::storage::stream::ByteStream;

/// Chunk size used when a caller does not pick one
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Backend contract for blob persistence
#[async_trait]
pub trait StorageDriver: Send + Sync + fmt::Debug {
    /// Writes every chunk of `stream` in arrival order, replacing any prior
    /// content. Not atomic with respect to concurrent readers.
    async fn save(&self, id: &str, stream: ByteStream) -> StorageResult<()>;

    /// Opens `id` and returns a lazy stream of `chunk_size` chunks.
    ///
    /// Fails with `NotFound` if the blob is absent when the call starts. A
    /// blob removed after the stream is opened may yield a short remainder
    /// instead of an error; the local driver keeps reading the unlinked file.
    async fn read(&self, id: &str, chunk_size: Option<usize>) -> StorageResult<ByteStream>;

    /// Removes `id`. Absent blobs are not an error.
    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// True iff `id` currently exists as a regular blob.
    async fn exists(&self, id: &str) -> StorageResult<bool>;

    /// Byte length of the current content.
    async fn size(&self, id: &str) -> StorageResult<u64>;

    /// Lowercase hex digest of the full current content.
    async fn hash(&self, id: &str, algorithm: &str, chunk_size: Option<usize>)
    -> StorageResult<String>;
}

/// Available storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Local,
    Memory,
}

/// Builds the backend selected by `config`.
pub fn build_driver(config: &StorageConfig) -> StorageResult<Arc<dyn StorageDriver>> {
    match config.driver {
        DriverKind::Local => Ok(Arc::new(LocalDriver::with_chunk_size(
            &config.base_dir,
            config.chunk_size,
        )?)),
        DriverKind::Memory => Ok(Arc::new(MemoryDriver::with_chunk_size(config.chunk_size))),
    }
}
