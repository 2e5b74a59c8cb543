//! Test doubles for the upload pipeline.
//!
//! These allow exercising the orchestrator without ffmpeg binaries, object
//! stores or a persistent record store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use uuid::Uuid;

use tubely_core::{AppError, StorageBackend, Video, VideoReference};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_storage::{Storage, StorageError, StorageResult};

use crate::error::MediaToolError;
use crate::video::toolkit::MediaToolkit;

/// A call observed by [`FakeMediaToolkit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Inspect(PathBuf),
    Remux { input: PathBuf, output: PathBuf },
}

#[derive(Debug, Clone)]
enum Outcome<T> {
    Succeed(T),
    Fail(String),
}

/// Scripted [`MediaToolkit`].
///
/// `inspect` returns a canned ffprobe report; `remux_fast_start` copies the input
/// byte-for-byte to the output path. Either can be scripted to fail like a tool
/// exiting non-zero.
#[derive(Debug, Clone)]
pub struct FakeMediaToolkit {
    probe: Outcome<Vec<u8>>,
    remux: Outcome<()>,
    remux_delay: Option<Duration>,
    calls: Arc<Mutex<Vec<ToolCall>>>,
}

impl FakeMediaToolkit {
    /// Report a single video stream of the given size.
    pub fn with_geometry(width: u32, height: u32) -> Self {
        let report = serde_json::json!({
            "streams": [
                { "index": 0, "codec_type": "audio", "codec_name": "aac" },
                { "index": 1, "codec_type": "video", "codec_name": "h264", "width": width, "height": height }
            ]
        });
        Self::with_probe_output(report.to_string().into_bytes())
    }

    /// Return `stdout` verbatim from `inspect`.
    pub fn with_probe_output(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            probe: Outcome::Succeed(stdout.into()),
            remux: Outcome::Succeed(()),
            remux_delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_probe(mut self, stderr: &str) -> Self {
        self.probe = Outcome::Fail(stderr.to_string());
        self
    }

    pub fn failing_remux(mut self, stderr: &str) -> Self {
        self.remux = Outcome::Fail(stderr.to_string());
        self
    }

    /// Hold the remux for `delay` before writing its output, like a slow ffmpeg run.
    pub fn with_remux_delay(mut self, delay: Duration) -> Self {
        self.remux_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: ToolCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn failure(tool: &'static str, stderr: &str) -> MediaToolError {
        MediaToolError::Failed {
            tool,
            status: "exit status: 1".to_string(),
            stderr: stderr.to_string(),
        }
    }
}

#[async_trait]
impl MediaToolkit for FakeMediaToolkit {
    async fn inspect(&self, path: &Path) -> Result<Vec<u8>, MediaToolError> {
        self.record(ToolCall::Inspect(path.to_path_buf()));
        match &self.probe {
            Outcome::Succeed(stdout) => Ok(stdout.clone()),
            Outcome::Fail(stderr) => Err(Self::failure("ffprobe", stderr)),
        }
    }

    async fn remux_fast_start(&self, input: &Path, output: &Path) -> Result<(), MediaToolError> {
        self.record(ToolCall::Remux {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
        if let Some(delay) = self.remux_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.remux {
            Outcome::Succeed(()) => {
                tokio::fs::copy(input, output)
                    .await
                    .map_err(|source| MediaToolError::Spawn {
                        tool: "ffmpeg",
                        source,
                    })?;
                Ok(())
            }
            Outcome::Fail(stderr) => {
                // Real ffmpeg leaves a truncated output behind on failure.
                let _ = tokio::fs::write(output, b"partial").await;
                Err(Self::failure("ffmpeg", stderr))
            }
        }
    }
}

/// An object received by [`RecordingStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// In-memory [`Storage`] that records every upload.
#[derive(Clone)]
pub struct RecordingStorage {
    bucket: String,
    objects: Arc<Mutex<Vec<StoredObject>>>,
    fail_uploads: Arc<AtomicBool>,
}

impl RecordingStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Arc::new(Mutex::new(Vec::new())),
            fail_uploads: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<VideoReference> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("connection reset".to_string()));
        }

        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;

        if let Ok(mut objects) = self.objects.lock() {
            objects.push(StoredObject {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                content_type: content_type.to_string(),
                body,
            });
        }
        Ok(VideoReference::new(self.bucket.clone(), key))
    }

    async fn get_presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "https://{}.example.test/{}?ttl={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}

/// [`InMemoryVideoRepository`] whose writes can be switched to fail.
#[derive(Clone, Default)]
pub struct FlakyVideoRepository {
    inner: InMemoryVideoRepository,
    fail_updates: Arc<AtomicBool>,
    update_calls: Arc<Mutex<usize>>,
}

impl FlakyVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.lock().map(|c| *c).unwrap_or_default()
    }
}

#[async_trait]
impl VideoRepository for FlakyVideoRepository {
    async fn create_video(&self, video: Video) -> Result<Video, AppError> {
        self.inner.create_video(video).await
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        self.inner.get_video(id).await
    }

    async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        if let Ok(mut calls) = self.update_calls.lock() {
            *calls += 1;
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("database is locked".to_string()));
        }
        self.inner.update_video(video).await
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        self.inner.list_videos_for_user(user_id).await
    }
}
