//! File orchestration
//!
//! Combines driver operations into verified saves, background saves and
//! checked deletes.

pub mod file_service;
pub mod results;

pub use file_service::FileService;
pub use results::{BackgroundSave, FileDownload};
