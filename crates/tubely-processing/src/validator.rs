use tubely_core::constants::VIDEO_CONTENT_TYPE;

/// Validation errors for uploaded videos
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing content type")]
    MissingContentType,

    #[error("Malformed content type: {0}")]
    MalformedContentType(String),

    #[error("Invalid content type: {content_type} (allowed: {allowed})")]
    InvalidContentType {
        content_type: String,
        allowed: &'static str,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Empty file")]
    EmptyFile,
}

/// Upload preconditions that are checked before and right after staging.
#[derive(Debug, Clone)]
pub struct VideoUploadValidator {
    max_file_size: u64,
}

impl VideoUploadValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Validate the declared content type of the uploaded part.
    ///
    /// Parameters after `;` are ignored and type/subtype compare
    /// case-insensitively; the result must be exactly `video/mp4`. Returns the
    /// normalized media type.
    pub fn validate_content_type(
        &self,
        content_type: Option<&str>,
    ) -> Result<&'static str, ValidationError> {
        let raw = content_type.ok_or(ValidationError::MissingContentType)?;
        let media_type = parse_media_type(raw)?;

        if media_type != VIDEO_CONTENT_TYPE {
            return Err(ValidationError::InvalidContentType {
                content_type: media_type,
                allowed: VIDEO_CONTENT_TYPE,
            });
        }

        Ok(VIDEO_CONTENT_TYPE)
    }

    /// Validate staged file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c)
        })
}

/// Lowercased `type/subtype` of a Content-Type header value.
pub fn parse_media_type(raw: &str) -> Result<String, ValidationError> {
    let essence = raw.split(';').next().unwrap_or_default().trim();
    let (kind, subtype) = essence
        .split_once('/')
        .ok_or_else(|| ValidationError::MalformedContentType(raw.to_string()))?;

    if !is_token(kind) || !is_token(subtype) {
        return Err(ValidationError::MalformedContentType(raw.to_string()));
    }

    Ok(format!("{}/{}", kind, subtype).to_ascii_lowercase())
}
