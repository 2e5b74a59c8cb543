//! Shared key generation for storage backends.
//!
//! Key format: `{aspect bucket}/{hex of 16 random bytes}.mp4`.

use rand::Rng;
use tubely_core::constants::{KEY_RANDOM_BYTES, VIDEO_EXTENSION};
use tubely_core::AspectBucket;

/// Generate a storage key for a video classified into `bucket`.
///
/// The identifier comes from the thread-local CSPRNG. Collisions are not checked
/// against the store; 128 bits make them negligible.
pub fn generate_video_key(bucket: AspectBucket) -> String {
    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..KEY_RANDOM_BYTES).map(|_| rng.random()).collect();
    format!(
        "{}/{}.{}",
        bucket.as_str(),
        hex::encode(random_bytes),
        VIDEO_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_key_shape(key: &str, prefix: &str) {
        let (head, file) = key.split_once('/').unwrap();
        assert_eq!(head, prefix);
        let id = file.strip_suffix(".mp4").unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_key_format_per_bucket() {
        assert_key_shape(&generate_video_key(AspectBucket::Landscape), "landscape");
        assert_key_shape(&generate_video_key(AspectBucket::Portrait), "portrait");
        assert_key_shape(&generate_video_key(AspectBucket::Other), "other");
    }

    #[test]
    fn test_keys_differ() {
        let a = generate_video_key(AspectBucket::Other);
        let b = generate_video_key(AspectBucket::Other);
        assert_ne!(a, b);
    }
}
