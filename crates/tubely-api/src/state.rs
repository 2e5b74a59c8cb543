use std::sync::Arc;

use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{VideoUploadOrchestrator, VideoUrlResolver};
use tubely_storage::LocalStorage;

use crate::auth::IdentityResolver;

/// Shared handler state. Built once at start-up; every collaborator is injected.
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub orchestrator: Arc<VideoUploadOrchestrator>,
    pub resolver: VideoUrlResolver,
    pub identity: Arc<dyn IdentityResolver>,
    /// Present when objects live on the local filesystem and the API serves them.
    pub local_media: Option<Arc<LocalStorage>>,
}
