//! Local filesystem driver
//!
//! Stores one regular file per identifier at `root/identifier`. No sidecar
//! metadata, no index.

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, error, info};
use std::fs as std_fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{StorageError, StorageResult};
use crate::storage::digest::{HashAlgorithm, digest_stream};
use crate::storage::driver::{DEFAULT_CHUNK_SIZE, StorageDriver};
use crate::storage::sandbox::PathSandbox;
use crate::storage::stream::{ByteStream, from_reader};

/// Storage driver backed by a directory on the local filesystem
#[derive(Debug)]
pub struct LocalDriver {
    sandbox: PathSandbox,
    chunk_size: usize,
}

impl LocalDriver {
    pub fn new(base_dir: impl AsRef<Path>) -> StorageResult<Self> {
        Self::with_chunk_size(base_dir, DEFAULT_CHUNK_SIZE)
    }

    /// Validates `base_dir` and uses `chunk_size` as the default read size.
    pub fn with_chunk_size(base_dir: impl AsRef<Path>, chunk_size: usize) -> StorageResult<Self> {
        let root = validate_base_dir(base_dir.as_ref())?;
        info!("Local storage root: {}", root.display());

        Ok(Self {
            sandbox: PathSandbox::new(root)?,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Canonical storage root
    pub fn base_dir(&self) -> &Path {
        self.sandbox.root()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

/// Checks that `base_dir` exists, is a directory and is writable, and
/// returns its canonical form. The directory is never created here.
pub fn validate_base_dir(base_dir: &Path) -> StorageResult<PathBuf> {
    let invalid = |reason: &str| StorageError::InvalidRoot {
        path: base_dir.to_path_buf(),
        reason: reason.to_string(),
    };

    let metadata = match std_fs::metadata(base_dir) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(invalid("does not exist")),
        Err(e) => return Err(StorageError::Io(e)),
    };

    if !metadata.is_dir() {
        return Err(invalid("not a directory"));
    }

    if metadata.permissions().readonly() {
        return Err(invalid("no write permission"));
    }

    Ok(std_fs::canonicalize(base_dir)?)
}

#[async_trait]
impl StorageDriver for LocalDriver {
    async fn save(&self, id: &str, mut stream: ByteStream) -> StorageResult<()> {
        let path = self.sandbox.resolve(id)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            error!("Failed to create {} ({}): {}", id, path.display(), e);
            StorageError::Io(e)
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Err(e) = file.write_all(&chunk).await {
                error!("Failed to write {} ({}): {}", id, path.display(), e);
                return Err(StorageError::Io(e));
            }
            total_bytes += chunk.len() as u64;
        }

        file.flush().await?;

        info!("Saved {} ({} bytes)", id, total_bytes);
        Ok(())
    }

    async fn read(&self, id: &str, chunk_size: Option<usize>) -> StorageResult<ByteStream> {
        let path = self.sandbox.resolve(id)?;

        let file = fs::File::open(&path)
            .await
            .map_err(|e| StorageError::from_io(id, e))?;

        if !file.metadata().await?.is_file() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        let chunk_size = chunk_size.unwrap_or(self.chunk_size);
        debug!("Reading {} in {} byte chunks", id, chunk_size);

        Ok(from_reader(file, chunk_size))
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.sandbox.resolve(id)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {} ({})", id, path.display());
                Ok(())
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                debug!("Delete of absent {} ignored", id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete {} ({}): {}", id, path.display(), e);
                Err(StorageError::Io(e))
            }
        }
    }

    async fn exists(&self, id: &str) -> StorageResult<bool> {
        let path = self.sandbox.resolve(id)?;

        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn size(&self, id: &str) -> StorageResult<u64> {
        let path = self.sandbox.resolve(id)?;

        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| StorageError::from_io(id, e))?;

        if !metadata.is_file() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        Ok(metadata.len())
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
