/// Prefix for authenticated JSON routes.
pub const API_PREFIX: &str = "/api";

/// Prefix under which the local backend serves presigned objects. Must match the
/// path component of `LOCAL_STORAGE_BASE_URL`.
pub const MEDIA_PREFIX: &str = "/media";
