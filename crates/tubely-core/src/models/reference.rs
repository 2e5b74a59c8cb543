//! Persisted pointer to an uploaded video object.

use crate::constants::REFERENCE_SEPARATOR;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucket name and object key of an uploaded video.
///
/// Persisted on the video record as `"<bucket>,<key>"`. Neither part may contain
/// the separator, so parsing a persisted value back is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub bucket: String,
    pub key: String,
}

impl VideoReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse a persisted reference.
    ///
    /// Anything other than exactly two separator-delimited parts is a
    /// [`AppError::DataIntegrity`] failure, distinct from store-side errors.
    pub fn parse(stored: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = stored.split(REFERENCE_SEPARATOR).collect();
        match parts.as_slice() {
            [bucket, key] if !bucket.is_empty() && !key.is_empty() => {
                Ok(Self::new(*bucket, *key))
            }
            _ => Err(AppError::DataIntegrity(format!(
                "malformed video reference '{}': expected '<bucket>{}<key>'",
                stored, REFERENCE_SEPARATOR
            ))),
        }
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.bucket, REFERENCE_SEPARATOR, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_parts() {
        let reference = VideoReference::parse("bucket-x,landscape/abc.mp4").unwrap();
        assert_eq!(reference.bucket, "bucket-x");
        assert_eq!(reference.key, "landscape/abc.mp4");
        assert_eq!(reference.to_string(), "bucket-x,landscape/abc.mp4");
    }

    #[test]
    fn test_parse_rejects_wrong_part_count() {
        for stored in ["bucket-only", "a,b,c", "", ",key", "bucket,"] {
            let err = VideoReference::parse(stored).unwrap_err();
            assert!(
                matches!(err, AppError::DataIntegrity(_)),
                "expected data integrity error for {:?}",
                stored
            );
        }
    }
}
