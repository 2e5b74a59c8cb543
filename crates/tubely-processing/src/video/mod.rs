//! Video upload pipeline

pub mod aspect;
pub mod orchestration;
pub mod prober;
pub mod remux;
pub mod toolkit;
pub mod url_resolver;

pub use aspect::classify;
pub use orchestration::{UploadStage, VideoUploadOrchestrator};
pub use prober::{parse_probe_output, probe, StreamGeometry};
pub use remux::remux_fast_start;
pub use toolkit::{FfmpegToolkit, MediaToolkit};
pub use url_resolver::VideoUrlResolver;
