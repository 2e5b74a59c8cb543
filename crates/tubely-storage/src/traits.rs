//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;
use tubely_core::{AppError, VideoReference};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Signed URL has expired")]
    Expired,

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Object not found: {}", key)),
            StorageError::InvalidSignature | StorageError::Expired => {
                AppError::Forbidden(err.to_string())
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The upload pipeline writes through this trait and the read path asks it for
/// signed URLs, so neither depends on a concrete backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket that uploads are written to.
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Stream `reader` to `key` in this backend's bucket with the given content type.
    ///
    /// The reader is consumed until EOF. Returns the (bucket, key) reference of the
    /// stored object. A failed upload leaves no object behind beyond what the
    /// backend itself guarantees.
    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<VideoReference>;

    /// Generate a time-limited GET URL for `key` in `bucket`.
    async fn get_presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}

/// Reject keys that could escape the bucket or break the persisted reference format.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains(',') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
