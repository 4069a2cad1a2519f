pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod storage;
pub mod transport;

pub use crate::config::{AppConfig, StorageConfig};
pub use error::{StorageError, StorageResult, TransportError};
pub use service::FileService;
pub use storage::{ByteStream, StorageDriver};
