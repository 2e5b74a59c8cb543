//! Constants shared across crates.

/// The only content type accepted for video uploads.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// File extension appended to every stored video key.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Number of random bytes in a storage key identifier (128 bits).
pub const KEY_RANDOM_BYTES: usize = 16;

/// Separator between bucket and key in a persisted video reference.
pub const REFERENCE_SEPARATOR: char = ',';

/// Default validity window for signed retrieval URLs.
pub const DEFAULT_PRESIGNED_URL_TTL_SECS: u64 = 60;
