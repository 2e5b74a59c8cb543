//! Tubely Processing Library
//!
//! The upload pipeline: staging, probing, aspect classification, fast-start
//! remuxing, storage upload and signed URL resolution. External media tools are
//! reached only through [`MediaToolkit`], so the pipeline runs against either real
//! ffmpeg/ffprobe binaries or a scripted fake.

pub mod error;
pub mod staging;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod validator;
pub mod video;

pub use error::{MediaToolError, StagingError};
pub use staging::{StagedFile, StagingArea};
pub use validator::{ValidationError, VideoUploadValidator};
pub use video::{
    classify, FfmpegToolkit, MediaToolkit, StreamGeometry, UploadStage, VideoUploadOrchestrator,
    VideoUrlResolver,
};
