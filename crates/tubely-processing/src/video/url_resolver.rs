use std::sync::Arc;
use std::time::Duration;

use tubely_core::{AppError, Video, VideoReference, VideoResponse};
use tubely_storage::Storage;

/// Turns persisted video references into short-lived signed GET URLs.
///
/// URLs are recomputed on every read and never persisted.
#[derive(Clone)]
pub struct VideoUrlResolver {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl VideoUrlResolver {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a persisted `"<bucket>,<key>"` reference.
    ///
    /// A malformed reference is [`AppError::DataIntegrity`]; a signing failure is
    /// [`AppError::Storage`].
    pub async fn resolve(&self, stored: &str) -> Result<String, AppError> {
        let reference = VideoReference::parse(stored)?;
        self.sign(&reference).await
    }

    pub async fn sign(&self, reference: &VideoReference) -> Result<String, AppError> {
        self.storage
            .get_presigned_url(&reference.bucket, &reference.key, self.ttl)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %reference.bucket,
                    key = %reference.key,
                    "Failed to sign video URL"
                );
                AppError::Storage(e.to_string())
            })
    }

    /// Client view of `video` with a freshly signed URL, if it has been uploaded.
    pub async fn sign_video(&self, video: Video) -> Result<VideoResponse, AppError> {
        let signed = match video.video_url.as_deref() {
            Some(stored) => Some(self.resolve(stored).await?),
            None => None,
        };
        Ok(VideoResponse::from_video(video, signed))
    }

    pub async fn sign_videos(&self, videos: Vec<Video>) -> Result<Vec<VideoResponse>, AppError> {
        let mut responses = Vec::with_capacity(videos.len());
        for video in videos {
            responses.push(self.sign_video(video).await?);
        }
        Ok(responses)
    }
}
