use serde::Deserialize;
use std::path::Path;

use super::toolkit::MediaToolkit;
use crate::error::MediaToolError;

/// Declared frame size of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Extract the geometry of the first stream whose `codec_type` is `video`.
///
/// A report without video streams yields 0x0, which classifies as `other`.
pub fn parse_probe_output(stdout: &[u8]) -> Result<StreamGeometry, MediaToolError> {
    let output: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| MediaToolError::InvalidOutput {
            tool: "ffprobe",
            message: e.to_string(),
        })?;

    let geometry = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .map(|s| StreamGeometry {
            width: s.width.unwrap_or(0),
            height: s.height.unwrap_or(0),
        })
        .unwrap_or_default();

    Ok(geometry)
}

/// Inspect `path` and return its video stream geometry.
pub async fn probe(
    toolkit: &dyn MediaToolkit,
    path: &Path,
) -> Result<StreamGeometry, MediaToolError> {
    let stdout = toolkit.inspect(path).await?;
    let geometry = parse_probe_output(&stdout)?;

    tracing::info!(
        width = geometry.width,
        height = geometry.height,
        "Video probe completed"
    );
    Ok(geometry)
}
