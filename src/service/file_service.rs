//! File service
//!
//! Orchestrates a single storage driver. Holds no per-request state; all
//! durable state lives in the backend.

use bytes::Bytes;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::{DEFAULT_BACKGROUND_GRACE_MS, StorageConfig};
use crate::error::{StorageError, StorageResult};
use crate::service::results::{BackgroundSave, FileDownload};
use crate::storage::driver::{StorageDriver, build_driver};
use crate::storage::stream::{ByteStream, collect, from_bytes};

#[derive(Debug, Clone)]
pub struct FileService {
    driver: Arc<dyn StorageDriver>,
    background_grace: Duration,
}

impl FileService {
    pub fn new(driver: Arc<dyn StorageDriver>) -> Self {
        Self::with_background_grace(driver, Duration::from_millis(DEFAULT_BACKGROUND_GRACE_MS))
    }

    pub fn with_background_grace(driver: Arc<dyn StorageDriver>, background_grace: Duration) -> Self {
        Self {
            driver,
            background_grace,
        }
    }

    /// Builds the configured driver and wraps it.
    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        let driver = build_driver(config)?;
        Ok(Self::with_background_grace(driver, config.background_grace()))
    }

    pub fn driver(&self) -> &Arc<dyn StorageDriver> {
        &self.driver
    }

    pub async fn save_file(&self, file_id: &str, stream: ByteStream) -> StorageResult<()> {
        self.driver.save(file_id, stream).await
    }

    /// Saves `stream`, then hashes the stored blob and compares it with
    /// `expected_hash`.
    ///
    /// On mismatch the blob is left saved and `HashMismatch` is returned;
    /// callers wanting rollback must delete it themselves.
    pub async fn save_file_with_hash_check(
        &self,
        file_id: &str,
        stream: ByteStream,
        expected_hash: &str,
        algorithm: &str,
    ) -> StorageResult<()> {
        self.driver.save(file_id, stream).await?;

        let actual = self.driver.hash(file_id, algorithm, None).await?;
        if actual != expected_hash.trim().to_ascii_lowercase() {
            warn!(
                "Hash mismatch for {} ({}): expected {}, got {}",
                file_id, algorithm, expected_hash, actual
            );
            return Err(StorageError::HashMismatch {
                expected: expected_hash.to_string(),
                actual,
            });
        }

        debug!("Verified {} with {}", file_id, algorithm);
        Ok(())
    }

    /// Buffers `stream` in memory, then saves it on a separate task.
    ///
    /// Waits at most the grace period. Once that elapses the caller gets
    /// `Detached` and the save runs on unobserved. Failures of the save are
    /// logged and never returned, whether or not the grace period elapsed.
    /// Only errors while draining `stream` reach the caller.
    pub async fn save_file_background(
        &self,
        file_id: &str,
        stream: ByteStream,
    ) -> StorageResult<BackgroundSave> {
        let content = collect(stream).await?;

        let task = tokio::spawn(save_silently(
            Arc::clone(&self.driver),
            file_id.to_string(),
            content,
        ));

        // Dropping the handle on timeout detaches the task without aborting it.
        match timeout(self.background_grace, task).await {
            Ok(Ok(())) => Ok(BackgroundSave::Finished),
            Ok(Err(e)) => {
                warn!("Background save task for {} ended abnormally: {}", file_id, e);
                Ok(BackgroundSave::Finished)
            }
            Err(_) => {
                info!(
                    "Background save of {} still running after {:?}; detaching",
                    file_id, self.background_grace
                );
                Ok(BackgroundSave::Detached)
            }
        }
    }

    /// Opens a lazy read stream for `filename`.
    pub async fn get_file(&self, filename: &str) -> StorageResult<FileDownload> {
        let stream = self.driver.read(filename, None).await?;
        Ok(FileDownload {
            identifier: filename.to_string(),
            stream,
        })
    }

    /// Reads the whole blob into one buffer. Unbounded in memory.
    pub async fn read_file_fully(&self, filename: &str) -> StorageResult<Bytes> {
        let stream = self.driver.read(filename, None).await?;
        Ok(collect(stream).await?)
    }

    pub async fn delete_file(&self, filename: &str) -> StorageResult<()> {
        self.driver.delete(filename).await
    }

    /// Deletes `filename`, failing if it was absent beforehand or is still
    /// observable afterwards.
    pub async fn delete_file_checked(&self, filename: &str) -> StorageResult<()> {
        if !self.driver.exists(filename).await? {
            return Err(StorageError::NotFound(filename.to_string()));
        }

        self.driver.delete(filename).await?;

        if self.driver.exists(filename).await? {
            warn!("{} still present after delete", filename);
            return Err(StorageError::DeleteVerification(filename.to_string()));
        }

        Ok(())
    }

    pub async fn check_file_exists(&self, filename: &str) -> StorageResult<bool> {
        self.driver.exists(filename).await
    }

    pub async fn get_file_size(&self, filename: &str) -> StorageResult<u64> {
        self.driver.size(filename).await
    }

    pub async fn get_file_hash(&self, filename: &str, algorithm: &str) -> StorageResult<String> {
        self.driver.hash(filename, algorithm, None).await
    }
}

/// Background save body. Errors stop here.
async fn save_silently(driver: Arc<dyn StorageDriver>, file_id: String, content: Bytes) {
    let size = content.len();
    match driver.save(&file_id, from_bytes(content)).await {
        Ok(()) => debug!("Background save of {} finished ({} bytes)", file_id, size),
        Err(e) => warn!("Background save of {} failed: {}", file_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryDriver;

    fn service() -> FileService {
        FileService::new(Arc::new(MemoryDriver::new()))
    }

    #[tokio::test]
    async fn test_hash_check_accepts_uppercase_expected() {
        let service = service();
        service
            .save_file_with_hash_check(
                "abc",
                from_bytes(&b"abc"[..]),
                "900150983CD24FB0D6963F7D28E17F72",
                "md5",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_hash_check_unknown_algorithm_after_save() {
        let service = service();
        let result = service
            .save_file_with_hash_check("abc", from_bytes(&b"abc"[..]), "00", "crc-nope")
            .await;

        assert!(matches!(result, Err(StorageError::UnsupportedAlgorithm(_))));
        assert!(service.check_file_exists("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_mismatch_reports_expected_as_given() {
        let service = service();
        let result = service
            .save_file_with_hash_check("abc", from_bytes(&b"abc"[..]), " DEADBEEF ", "md5")
            .await;

        match result {
            Err(StorageError::HashMismatch { expected, actual }) => {
                assert_eq!(expected, " DEADBEEF ");
                assert_eq!(actual, "900150983cd24fb0d6963f7d28e17f72");
            }
            other => panic!("expected hash mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_background_save_finishes_within_grace() {
        let service =
            FileService::with_background_grace(Arc::new(MemoryDriver::new()), Duration::from_secs(10));
        let outcome = service
            .save_file_background("bg", from_bytes(&b"quick"[..]))
            .await
            .unwrap();

        assert_eq!(outcome, BackgroundSave::Finished);
        assert_eq!(&service.read_file_fully("bg").await.unwrap()[..], b"quick");
    }

    #[tokio::test]
    async fn test_from_config_memory_driver() {
        let config = StorageConfig {
            driver: crate::storage::driver::DriverKind::Memory,
            background_grace_ms: 5,
            ..StorageConfig::default()
        };
        let service = FileService::from_config(&config).unwrap();
        assert_eq!(service.background_grace, Duration::from_millis(5));
        assert!(!service.check_file_exists("anything").await.unwrap());
    }
}
