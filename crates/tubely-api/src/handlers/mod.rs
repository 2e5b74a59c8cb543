pub mod health;
pub mod media;
pub mod video_upload;
pub mod videos;
