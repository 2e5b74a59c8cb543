//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::auth::{IdentityResolver, JwtIdentityResolver};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{
    FfmpegToolkit, MediaToolkit, StagingArea, VideoUploadOrchestrator, VideoUploadValidator,
    VideoUrlResolver,
};

/// Collaborators the application is assembled from. Production wiring builds
/// them from configuration; tests substitute their own.
pub struct Components {
    pub videos: Arc<dyn VideoRepository>,
    pub storage: storage::StorageSetup,
    pub toolkit: Arc<dyn MediaToolkit>,
    pub identity: Arc<dyn IdentityResolver>,
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    let toolkit = FfmpegToolkit::new(
        config.ffmpeg_path().to_string(),
        config.ffprobe_path().to_string(),
    )
    .context("Invalid media tool configuration")?;
    let storage = storage::setup_storage(&config).await?;

    let components = Components {
        videos: Arc::new(InMemoryVideoRepository::new()),
        storage,
        toolkit: Arc::new(toolkit),
        identity: Arc::new(JwtIdentityResolver::new(config.jwt_secret())),
    };

    let state = build_state(config, components).await?;
    let router = routes::setup_routes(state.clone());
    Ok((state, router))
}

/// Wire the upload pipeline and handler state from its parts.
pub async fn build_state(config: Config, components: Components) -> Result<Arc<AppState>> {
    crate::error::init_error_details(config.is_production());

    let staging_dir = config.staging_dir();
    let staging = StagingArea::open(&staging_dir)
        .await
        .with_context(|| format!("Unusable staging dir {}", staging_dir.display()))?;

    let storage::StorageSetup { storage, local } = components.storage;

    let orchestrator = VideoUploadOrchestrator::new(
        components.videos.clone(),
        storage.clone(),
        components.toolkit,
        staging,
        VideoUploadValidator::new(config.max_video_size_bytes() as u64),
    );
    let resolver = VideoUrlResolver::new(storage, config.presigned_url_ttl());

    tracing::info!(
        environment = %config.environment(),
        url_ttl_secs = resolver.ttl().as_secs(),
        "Upload pipeline initialized"
    );

    Ok(Arc::new(AppState {
        config,
        videos: components.videos,
        orchestrator: Arc::new(orchestrator),
        resolver,
        identity: components.identity,
        local_media: local,
    }))
}
