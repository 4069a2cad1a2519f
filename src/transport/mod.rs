//! Transport adapter
//!
//! Boundary between a wire front end and the file service: validates upload
//! parameters, picks the save mode, and exposes download/delete semantics.
//! Status mapping lives in [`crate::error::handlers`].

pub mod operations;
pub mod params;

pub use operations::{UploadOutcome, content_disposition, delete, download, upload};
pub use params::UploadParams;
