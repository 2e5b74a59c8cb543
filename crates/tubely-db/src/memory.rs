use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tubely_core::{AppError, Video};
use uuid::Uuid;

use crate::video::VideoRepository;

/// Process-lifetime video store backed by a map.
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, video: Video) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(AppError::Persistence(format!(
                "video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());

        tracing::debug!(video_id = %video.id, user_id = %video.user_id, "Video record created");
        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                tracing::debug!(video_id = %video.id, "Video record updated");
                Ok(())
            }
            None => Err(AppError::Persistence(format!(
                "video {} does not exist",
                video.id
            ))),
        }
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let mut owned: Vec<Video> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}
