//! In-memory driver
//!
//! Keeps blobs in a map keyed by the lexically normalized identifier.
//! Contents are lost when the driver is dropped.
//!
//! Keys follow the same layout rules as files on disk: a blob cannot be
//! saved below another blob, nor where blobs already sit below it.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::storage::digest::{HashAlgorithm, digest_stream};
use crate::storage::driver::{DEFAULT_CHUNK_SIZE, StorageDriver};
use crate::storage::sandbox::normalize;
use crate::storage::stream::{ByteStream, collect};

#[derive(Debug)]
pub struct MemoryDriver {
    blobs: RwLock<HashMap<String, Bytes>>,
    chunk_size: usize,
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            chunk_size: chunk_size.max(1),
        }
    }
}

#[async_trait]
impl StorageDriver for MemoryDriver {
    async fn save(&self, id: &str, stream: ByteStream) -> StorageResult<()> {
        let key = normalize(id)?;
        // The empty key names the root, which is never a blob.
        if key.is_empty() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "identifier names the storage root",
            )));
        }

        let data = collect(stream).await?;
        let mut blobs = self.blobs.write().await;
        if let Some(e) = layout_conflict(&blobs, &key) {
            warn!("Cannot save {} in memory: {}", id, e);
            return Err(StorageError::Io(e));
        }

        info!("Saved {} ({} bytes) in memory", id, data.len());
        blobs.insert(key, data);
        Ok(())
    }

    async fn read(&self, id: &str, chunk_size: Option<usize>) -> StorageResult<ByteStream> {
        let key = normalize(id)?;
        let data = self
            .blobs
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        let chunk_size = chunk_size.unwrap_or(self.chunk_size).max(1);
        let chunks = (0..data.len()).step_by(chunk_size).map(move |start| {
            let end = (start + chunk_size).min(data.len());
            Ok::<_, io::Error>(data.slice(start..end))
        });

        Ok(stream::iter(chunks).boxed())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let key = normalize(id)?;
        if self.blobs.write().await.remove(&key).is_some() {
            info!("Deleted {} from memory", id);
        } else {
            debug!("Delete of absent {} ignored", id);
        }
        Ok(())
    }

    async fn exists(&self, id: &str) -> StorageResult<bool> {
        let key = normalize(id)?;
        Ok(self.blobs.read().await.contains_key(&key))
    }

    async fn size(&self, id: &str) -> StorageResult<u64> {
        let key = normalize(id)?;
        self.blobs
            .read()
            .await
            .get(&key)
            .map(|data| data.len() as u64)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn hash(
        &self,
        id: &str,
        algorithm: &str,
        chunk_size: Option<usize>,
    ) -> StorageResult<String> {
        let algorithm: HashAlgorithm = algorithm.parse()?;
        let stream = self.read(id, chunk_size).await?;
        digest_stream(stream, algorithm).await
    }
}

/// Checks `key` against existing blobs the way a filesystem would.
fn layout_conflict(blobs: &HashMap<String, Bytes>, key: &str) -> Option<io::Error> {
    let parent_blob = key
        .match_indices('/')
        .map(|(i, _)| &key[..i])
        .find(|prefix| blobs.contains_key(*prefix));
    if let Some(parent) = parent_blob {
        return Some(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("parent '{}' is a blob", parent),
        ));
    }

    let nested = format!("{}/", key);
    if blobs.keys().any(|existing| existing.starts_with(&nested)) {
        return Some(io::Error::new(
            io::ErrorKind::IsADirectory,
            format!("'{}' holds nested blobs", key),
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::stream::from_bytes;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_save_and_read_chunks() {
        let driver = MemoryDriver::with_chunk_size(4);
        driver
            .save("file.txt", from_bytes(&b"Hello, world!"[..]))
            .await
            .unwrap();

        let chunks: Vec<Bytes> = driver
            .read("file.txt", None)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let sizes: Vec<usize> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(sizes, vec![4, 4, 4, 1]);
        assert_eq!(chunks.concat(), b"Hello, world!");
    }

    #[tokio::test]
    async fn test_equivalent_identifiers_alias() {
        let driver = MemoryDriver::new();
        driver
            .save("dir/./a.txt", from_bytes(&b"x"[..]))
            .await
            .unwrap();
        assert!(driver.exists("dir/b/../a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_escape_and_root() {
        let driver = MemoryDriver::new();
        assert!(matches!(
            driver.save("../x", from_bytes(&b"x"[..])).await,
            Err(StorageError::PathEscape(_))
        ));
        assert!(matches!(
            driver.exists("/etc/passwd").await,
            Err(StorageError::PathEscape(_))
        ));
        assert!(!driver.exists("").await.unwrap());
        assert!(matches!(
            driver.save(".", from_bytes(&b"x"[..])).await,
            Err(StorageError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_size_hash() {
        let driver = MemoryDriver::new();
        driver
            .save("abc", from_bytes(&b"abc"[..]))
            .await
            .unwrap();

        assert_eq!(driver.size("abc").await.unwrap(), 3);
        assert_eq!(
            driver.hash("abc", "md5", None).await.unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );

        driver.delete("abc").await.unwrap();
        driver.delete("abc").await.unwrap();
        assert!(matches!(
            driver.size("abc").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_blob_and_nested_blob_conflict() {
        let driver = MemoryDriver::new();
        driver.save("a", from_bytes(&b"x"[..])).await.unwrap();

        assert!(matches!(
            driver.save("a/b", from_bytes(&b"y"[..])).await,
            Err(StorageError::Io(ref e)) if e.kind() == io::ErrorKind::NotADirectory
        ));
        assert!(!driver.exists("a/b").await.unwrap());
        driver.delete("a/b").await.unwrap();

        driver.save("dir/inner", from_bytes(&b"z"[..])).await.unwrap();
        assert!(matches!(
            driver.save("dir", from_bytes(&b"w"[..])).await,
            Err(StorageError::Io(ref e)) if e.kind() == io::ErrorKind::IsADirectory
        ));
        assert!(matches!(
            driver.size("dir").await,
            Err(StorageError::NotFound(_))
        ));

        driver.save("a", from_bytes(&b"replaced"[..])).await.unwrap();
        driver.save("dir2", from_bytes(&b"ok"[..])).await.unwrap();
    }
}
