//! External media tools behind a capability trait.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::MediaToolError;

/// Media inspection and remux capability.
///
/// [`FfmpegToolkit`] shells out to ffprobe/ffmpeg; the test helpers provide a
/// scripted fake so pipeline branching can be exercised without binaries.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Return the tool's structured stream report (ffprobe JSON) for `path`.
    async fn inspect(&self, path: &Path) -> Result<Vec<u8>, MediaToolError>;

    /// Stream-copy `input` into a new container at `output` with its index moved
    /// to the front. No re-encoding.
    async fn remux_fast_start(&self, input: &Path, output: &Path) -> Result<(), MediaToolError>;
}

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_path(path: &str) -> Result<(), MediaToolError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(MediaToolError::InvalidPath(format!(
            "contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(MediaToolError::InvalidPath(format!(
            "contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

fn validate_tool_path(tool_path: &str) -> Result<(), MediaToolError> {
    validate_path(tool_path).map_err(|_| MediaToolError::InvalidToolPath(tool_path.to_string()))?;

    if tool_path.is_empty()
        || !tool_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(MediaToolError::InvalidToolPath(tool_path.to_string()));
    }

    Ok(())
}

/// ffprobe/ffmpeg subprocess implementation.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegToolkit {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Result<Self, MediaToolError> {
        validate_tool_path(&ffmpeg_path)?;
        validate_tool_path(&ffprobe_path)?;

        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
        })
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn inspect(&self, path: &Path) -> Result<Vec<u8>, MediaToolError> {
        validate_path(&path.to_string_lossy())?;
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| MediaToolError::Spawn {
                tool: "ffprobe",
                source,
            })?;

        if !output.status.success() {
            tracing::error!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "ffprobe failed"
            );
            return Err(MediaToolError::failed("ffprobe", output.status, &output.stderr));
        }

        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffprobe completed"
        );
        Ok(output.stdout)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux_fast_start(&self, input: &Path, output: &Path) -> Result<(), MediaToolError> {
        validate_path(&input.to_string_lossy())?;
        validate_path(&output.to_string_lossy())?;
        let start = std::time::Instant::now();

        let result = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MediaToolError::Spawn {
                tool: "ffmpeg",
                source,
            })?;

        if !result.status.success() {
            tracing::error!(
                status = %result.status,
                stderr = %String::from_utf8_lossy(&result.stderr),
                "ffmpeg fast-start remux failed"
            );
            return Err(MediaToolError::failed("ffmpeg", result.status, &result.stderr));
        }

        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffmpeg fast-start remux completed"
        );
        Ok(())
    }
}
