use std::ffi::OsString;
use std::path::PathBuf;

use super::toolkit::MediaToolkit;
use crate::error::MediaToolError;
use crate::staging::StagedFile;

const PROCESSING_SUFFIX: &str = ".processing";

fn processing_path(input: &StagedFile) -> PathBuf {
    let mut name = OsString::from(input.path().as_os_str());
    name.push(PROCESSING_SUFFIX);
    PathBuf::from(name)
}

/// Rewrite `input` for fast start into `<input>.processing`.
///
/// The output is owned by the returned [`StagedFile`]. On failure any partial
/// output is removed before the error is returned; `input` is left for the caller.
pub async fn remux_fast_start(
    toolkit: &dyn MediaToolkit,
    input: &StagedFile,
) -> Result<StagedFile, MediaToolError> {
    let mut output = StagedFile::adopt(processing_path(input))
        .map_err(|e| MediaToolError::InvalidPath(e.to_string()))?;

    if let Err(e) = toolkit.remux_fast_start(input.path(), output.path()).await {
        output.dispose();
        return Err(e);
    }

    let size = output
        .refresh_size()
        .await
        .map_err(|e| MediaToolError::InvalidOutput {
            tool: "ffmpeg",
            message: e.to_string(),
        })?;

    tracing::info!(
        input_bytes = input.size(),
        output_bytes = size,
        "Fast-start remux completed"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::StagingArea;
    use crate::test_helpers::FakeMediaToolkit;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_output_is_adjacent_with_suffix() {
        let dir = TempDir::new().unwrap();
        let staged = StagingArea::new(dir.path())
            .stage(&mut &b"payload"[..])
            .await
            .unwrap();
        let toolkit = FakeMediaToolkit::with_geometry(1920, 1080);

        let output = remux_fast_start(&toolkit, &staged).await.unwrap();

        assert_eq!(output.path().parent(), staged.path().parent());
        assert_eq!(
            output.path().to_string_lossy(),
            format!("{}.processing", staged.path().display())
        );
        let mut body = Vec::new();
        output.open().await.unwrap().read_to_end(&mut body).await.unwrap();
        assert_eq!(body, b"payload");
        assert_eq!(output.size(), 7);
    }

    #[tokio::test]
    async fn test_failed_remux_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let staged = StagingArea::new(dir.path())
            .stage(&mut &b"payload"[..])
            .await
            .unwrap();
        let toolkit = FakeMediaToolkit::with_geometry(1920, 1080).failing_remux("moov atom not found");

        let result = remux_fast_start(&toolkit, &staged).await;

        assert!(matches!(result, Err(MediaToolError::Failed { tool: "ffmpeg", .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
