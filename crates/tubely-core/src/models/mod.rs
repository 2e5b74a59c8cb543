pub mod aspect;
pub mod reference;
pub mod video;

pub use aspect::AspectBucket;
pub use reference::VideoReference;
pub use video::{CreateVideoRequest, Video, VideoResponse};
