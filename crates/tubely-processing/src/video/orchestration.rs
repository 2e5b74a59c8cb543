//! Video upload orchestration: authorize → validate → stage → probe → remux →
//! upload → commit.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncRead;
use tracing::Instrument;
use tubely_core::{AppError, Video, VideoReference};
use tubely_db::VideoRepository;
use tubely_storage::{generate_video_key, Storage};
use uuid::Uuid;

use super::aspect::classify;
use super::prober::probe;
use super::remux::remux_fast_start;
use super::toolkit::MediaToolkit;
use crate::error::MediaToolError;
use crate::staging::{StagedFile, StagingArea};
use crate::validator::{ValidationError, VideoUploadValidator};

/// Stages of a single upload. `Aborted` is reachable from every other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Authorized,
    Validated,
    Staged,
    Probed,
    Remuxed,
    Uploaded,
    Committed,
    Aborted,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::Authorized => "authorized",
            UploadStage::Validated => "validated",
            UploadStage::Staged => "staged",
            UploadStage::Probed => "probed",
            UploadStage::Remuxed => "remuxed",
            UploadStage::Uploaded => "uploaded",
            UploadStage::Committed => "committed",
            UploadStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

fn enter(video_id: Uuid, stage: UploadStage) {
    tracing::debug!(video_id = %video_id, stage = %stage, "Upload stage reached");
}

fn abort(video_id: Uuid, from: UploadStage, err: AppError) -> AppError {
    tracing::warn!(
        video_id = %video_id,
        stage = %UploadStage::Aborted,
        from = %from,
        error_type = err.error_type(),
        error = %err,
        "Upload aborted"
    );
    err
}

fn validation_failure(err: ValidationError) -> AppError {
    AppError::InvalidInput(err.to_string())
}

fn probe_failure(err: MediaToolError) -> AppError {
    AppError::Probe(err.to_string())
}

fn remux_failure(err: MediaToolError) -> AppError {
    AppError::Remux(err.to_string())
}

/// Runs uploads against an injected record store, object store and media toolkit.
///
/// Each call is independent; the record store is the only shared mutable state.
/// Cloning shares the collaborators.
#[derive(Clone)]
pub struct VideoUploadOrchestrator {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    toolkit: Arc<dyn MediaToolkit>,
    staging: StagingArea,
    validator: VideoUploadValidator,
}

impl VideoUploadOrchestrator {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        toolkit: Arc<dyn MediaToolkit>,
        staging: StagingArea,
        validator: VideoUploadValidator,
    ) -> Self {
        Self {
            videos,
            storage,
            toolkit,
            staging,
            validator,
        }
    }

    /// Replace the video's stored object with `body`.
    ///
    /// Ownership and content type are checked before any file I/O. Staged files are
    /// removed on every exit path. If the upload succeeds but the record update
    /// fails, the uploaded object stays in the store unreferenced.
    ///
    /// Once the body is staged the rest of the pipeline runs on its own task, so
    /// dropping this future after staging does not interrupt the media tools or
    /// skip cleanup of their output.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id, user_id = %caller_id))]
    pub async fn upload_video<R>(
        &self,
        video_id: Uuid,
        caller_id: Uuid,
        content_type: Option<&str>,
        body: &mut R,
    ) -> Result<Video, AppError>
    where
        R: AsyncRead + Send + Unpin + ?Sized,
    {
        let start = Instant::now();
        enter(video_id, UploadStage::Received);

        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(|e| abort(video_id, UploadStage::Received, e))?
            .ok_or_else(|| {
                abort(
                    video_id,
                    UploadStage::Received,
                    AppError::NotFound(format!("Video {} not found", video_id)),
                )
            })?;

        if !video.is_owned_by(caller_id) {
            return Err(abort(
                video_id,
                UploadStage::Received,
                AppError::Forbidden("You don't own this video".to_string()),
            ));
        }
        enter(video_id, UploadStage::Authorized);

        let media_type = self
            .validator
            .validate_content_type(content_type)
            .map_err(|e| abort(video_id, UploadStage::Authorized, validation_failure(e)))?;
        enter(video_id, UploadStage::Validated);

        let staged = self.staging.stage(body).await.map_err(|e| {
            abort(
                video_id,
                UploadStage::Validated,
                AppError::Staging(e.to_string()),
            )
        })?;
        enter(video_id, UploadStage::Staged);

        let pipeline = self.clone();
        tokio::spawn(
            async move { pipeline.complete_staged(video, staged, media_type, start).await }
                .instrument(tracing::Span::current()),
        )
        .await
        .map_err(|e| {
            abort(
                video_id,
                UploadStage::Staged,
                AppError::Internal(format!("Upload task failed: {}", e)),
            )
        })?
    }

    /// Staged → Committed. Owns `staged` and disposes it before returning.
    async fn complete_staged(
        &self,
        mut video: Video,
        staged: StagedFile,
        media_type: &'static str,
        start: Instant,
    ) -> Result<Video, AppError> {
        let video_id = video.id;
        let outcome = self.process_staged(video_id, &staged, media_type).await;
        staged.dispose();
        let reference = outcome?;

        video.set_video_reference(&reference);
        if let Err(e) = self.videos.update_video(&video).await {
            tracing::error!(
                video_id = %video_id,
                bucket = %reference.bucket,
                key = %reference.key,
                "Uploaded object is not referenced by any video record"
            );
            let err = match e {
                AppError::Persistence(_) => e,
                other => AppError::Persistence(other.to_string()),
            };
            return Err(abort(video_id, UploadStage::Uploaded, err));
        }
        enter(video_id, UploadStage::Committed);

        tracing::info!(
            video_id = %video_id,
            bucket = %reference.bucket,
            key = %reference.key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video upload committed"
        );
        Ok(video)
    }

    /// Staged → Probed → Remuxed → Uploaded. The caller disposes `staged`.
    async fn process_staged(
        &self,
        video_id: Uuid,
        staged: &StagedFile,
        media_type: &str,
    ) -> Result<VideoReference, AppError> {
        self.validator
            .validate_file_size(staged.size())
            .map_err(|e| abort(video_id, UploadStage::Staged, validation_failure(e)))?;

        let geometry = probe(self.toolkit.as_ref(), staged.path())
            .await
            .map_err(|e| abort(video_id, UploadStage::Staged, probe_failure(e)))?;
        let bucket = classify(geometry.width, geometry.height);
        tracing::info!(
            video_id = %video_id,
            width = geometry.width,
            height = geometry.height,
            aspect = %bucket,
            "Video classified"
        );
        enter(video_id, UploadStage::Probed);

        let remuxed = remux_fast_start(self.toolkit.as_ref(), staged)
            .await
            .map_err(|e| abort(video_id, UploadStage::Probed, remux_failure(e)))?;
        enter(video_id, UploadStage::Remuxed);

        let key = generate_video_key(bucket);
        let uploaded = self.upload_remuxed(&remuxed, &key, media_type).await;
        remuxed.dispose();
        let reference = uploaded.map_err(|e| abort(video_id, UploadStage::Remuxed, e))?;
        enter(video_id, UploadStage::Uploaded);

        Ok(reference)
    }

    async fn upload_remuxed(
        &self,
        remuxed: &StagedFile,
        key: &str,
        media_type: &str,
    ) -> Result<VideoReference, AppError> {
        let file = remuxed
            .open()
            .await
            .map_err(|e| AppError::Staging(e.to_string()))?;

        self.storage
            .upload_stream(key, media_type, Some(remuxed.size()), Box::pin(file))
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}
