use tubely_core::{AppError, Video};
use uuid::Uuid;

/// Video metadata persistence.
///
/// Each call is atomic at record granularity; concurrent updates of the same
/// record are last-writer-wins. Write failures surface as
/// [`AppError::Persistence`].
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: Video) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist the full record, replacing whatever is stored under `video.id`.
    async fn update_video(&self, video: &Video) -> Result<(), AppError>;

    /// Videos owned by `user_id`, newest first.
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError>;
}
