//! Command handlers
//!
//! Runs a parsed command against the file service, reading upload bodies
//! from `input` and writing results to `output`.

use futures::StreamExt;
use log::info;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::cli::parser::{Command, USAGE};
use crate::error::handlers::error_to_status;
use crate::error::{CliError, TransportError};
use crate::service::FileService;
use crate::storage::stream::from_reader;
use crate::transport;

/// Input read size for upload bodies
const INPUT_CHUNK_SIZE: usize = 64 * 1024;

pub async fn execute<R, W>(
    service: &FileService,
    command: Command,
    input: R,
    output: &mut W,
) -> Result<(), CliError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    match command {
        Command::Put(params) => {
            let stream = from_reader(input, INPUT_CHUNK_SIZE);
            let outcome = transport::upload(service, &params, stream).await?;
            info!("put {}: {:?}", params.file_id, outcome);
        }
        Command::Get(file_id) => {
            let mut download = transport::download(service, &file_id).await?;
            let mut total_bytes = 0u64;
            while let Some(chunk) = download.stream.next().await {
                let chunk = chunk?;
                output.write_all(&chunk).await?;
                total_bytes += chunk.len() as u64;
            }
            info!(
                "get {} ({} bytes, {})",
                file_id,
                total_bytes,
                transport::content_disposition(&download)
            );
        }
        Command::Delete(file_id) => {
            transport::delete(service, &file_id).await?;
        }
        Command::Exists(file_id) => {
            let exists = service
                .check_file_exists(&file_id)
                .await
                .map_err(TransportError::from)?;
            output.write_all(format!("{}\n", exists).as_bytes()).await?;
        }
        Command::Size(file_id) => {
            let size = service
                .get_file_size(&file_id)
                .await
                .map_err(TransportError::from)?;
            output.write_all(format!("{}\n", size).as_bytes()).await?;
        }
        Command::Hash { file_id, algorithm } => {
            let digest = service
                .get_file_hash(&file_id, &algorithm)
                .await
                .map_err(TransportError::from)?;
            output.write_all(format!("{}\n", digest).as_bytes()).await?;
        }
        Command::Help => {
            output.write_all(format!("{}\n", USAGE).as_bytes()).await?;
        }
    }

    output.flush().await?;
    Ok(())
}

/// Process exit code for a failed command
pub fn exit_code(err: &CliError) -> u8 {
    match err {
        CliError::Usage(_) => 2,
        CliError::Config(_) => 3,
        CliError::Transport(e) => match error_to_status(e) {
            400 => 4,
            404 => 5,
            _ => 1,
        },
        CliError::Io(_) => 1,
    }
}
