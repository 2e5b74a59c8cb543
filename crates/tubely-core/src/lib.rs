//! Tubely Core Library
//!
//! This crate provides the domain model, error types and configuration shared by
//! every Tubely component: the video record, storage references, aspect buckets,
//! the request-terminal [`AppError`] and the environment-driven [`Config`].

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AspectBucket, CreateVideoRequest, Video, VideoReference, VideoResponse};
pub use storage_types::StorageBackend;
