//! Blob storage
//!
//! Driver contract, backends, path sandboxing, digests and stream helpers.

pub mod digest;
pub mod driver;
pub mod local;
pub mod memory;
pub mod sandbox;
pub mod stream;

pub use digest::HashAlgorithm;
pub use driver::{DEFAULT_CHUNK_SIZE, DriverKind, StorageDriver, build_driver};
pub use local::LocalDriver;
pub use memory::MemoryDriver;
pub use sandbox::PathSandbox;
pub use stream::ByteStream;
