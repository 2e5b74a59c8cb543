//! Tubely Storage Library
//!
//! Object store abstraction for uploaded videos, with an S3 implementation and a
//! local filesystem implementation for development.
//!
//! # Storage key format
//!
//! Every video object lives under `{landscape|portrait|other}/{32 hex chars}.mp4`
//! inside the backend's bucket. Key generation is centralized in the `keys` module
//! so all backends stay consistent. Keys must not contain `..`, `,` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use factory::create_local_storage;
pub use keys::generate_video_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
