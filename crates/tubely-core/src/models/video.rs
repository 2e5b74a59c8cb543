use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reference::VideoReference;

/// Video metadata record.
///
/// `video_url` holds the persisted `"<bucket>,<key>"` reference, or `None` until the
/// owner's first successful upload. It is only ever written by that upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(user_id: Uuid, title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Overwrite the storage reference. Reuploading replaces the previous value.
    pub fn set_video_reference(&mut self, reference: &VideoReference) {
        self.video_url = Some(reference.to_string());
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Client view of a video; `video_url` is a short-lived signed URL, never the
/// persisted reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_video(video: Video, signed_url: Option<String>) -> Self {
        VideoResponse {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            thumbnail_url: video.thumbnail_url,
            video_url: signed_url,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}
