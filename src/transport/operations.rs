//! Transport operations
//!
//! Maps upload, download and delete requests onto file service calls.

use log::info;

use crate::error::{StorageError, TransportError};
use crate::service::{BackgroundSave, FileDownload, FileService};
use crate::storage::stream::ByteStream;
use crate::transport::params::UploadParams;

/// What an accepted upload did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Stored,
    Verified,
    Background(BackgroundSave),
}

/// Validates `params` and saves `stream` in the requested mode.
///
/// A verified upload takes precedence over the background flag.
pub async fn upload(
    service: &FileService,
    params: &UploadParams,
    stream: ByteStream,
) -> Result<UploadOutcome, TransportError> {
    params.validate()?;

    let outcome = if let Some((hash, algorithm)) = params.hash_check() {
        service
            .save_file_with_hash_check(&params.file_id, stream, hash, algorithm)
            .await?;
        UploadOutcome::Verified
    } else if params.background {
        let save = service.save_file_background(&params.file_id, stream).await?;
        UploadOutcome::Background(save)
    } else {
        service.save_file(&params.file_id, stream).await?;
        UploadOutcome::Stored
    };

    info!("Upload of {} accepted: {:?}", params.file_id, outcome);
    Ok(outcome)
}

/// Opens `file_id` for download. The identifier doubles as the filename
/// label.
pub async fn download(service: &FileService, file_id: &str) -> Result<FileDownload, TransportError> {
    if !service.check_file_exists(file_id).await? {
        return Err(StorageError::NotFound(file_id.to_string()).into());
    }

    Ok(service.get_file(file_id).await?)
}

/// `Content-Disposition` value for a download
pub fn content_disposition(download: &FileDownload) -> String {
    format!("attachment; filename=\"{}\"", download.identifier)
}

/// Deletes `file_id`, reporting absence as `NotFound`.
pub async fn delete(service: &FileService, file_id: &str) -> Result<(), TransportError> {
    service.delete_file_checked(file_id).await?;
    Ok(())
}
