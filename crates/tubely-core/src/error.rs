//! Error types module
//!
//! Every failure that terminates an upload or read request is expressed as an
//! [`AppError`]. Crate-local errors (storage, external tools, staging) are mapped
//! into one of these variants at the orchestration boundary so that the HTTP layer
//! can render a distinguishing status and a client-safe message.
//!
//! None of these errors is retried automatically.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected but well-formed requests
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PROBE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The caller could not be identified.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is identified but does not own the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad identifier format, wrong content type, malformed form.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The request body ran past the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Local scratch I/O failed while staging the upload.
    #[error("Staging error: {0}")]
    Staging(String),

    /// The inspection process failed or produced unparsable output.
    #[error("Probe error: {0}")]
    Probe(String),

    /// The fast-start remux process failed.
    #[error("Remux error: {0}")]
    Remux(String),

    /// Object store upload or URL signing failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The metadata record could not be written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A persisted value does not have the expected shape.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid ID: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::Forbidden(_) => (403, "FORBIDDEN", false, LogLevel::Warn),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::Staging(_) => (500, "STAGING_FAILED", true, LogLevel::Error),
        AppError::Probe(_) => (500, "PROBE_FAILED", true, LogLevel::Error),
        AppError::Remux(_) => (500, "REMUX_FAILED", true, LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Persistence(_) => (500, "PERSISTENCE_ERROR", true, LogLevel::Error),
        AppError::DataIntegrity(_) => (500, "DATA_INTEGRITY_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Unauthorized(_) => "AuthenticationFailure",
            AppError::Forbidden(_) => "AuthorizationFailure",
            AppError::InvalidInput(_) => "ValidationFailure",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "ValidationFailure",
            AppError::Staging(_) => "StagingFailure",
            AppError::Probe(_) => "ProbeFailure",
            AppError::Remux(_) => "RemuxFailure",
            AppError::Storage(_) => "StoreFailure",
            AppError::Persistence(_) => "PersistenceFailure",
            AppError::DataIntegrity(_) => "DataIntegrity",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Staging(_) => "Failed to receive upload".to_string(),
            AppError::Probe(_) => "Failed to inspect video".to_string(),
            AppError::Remux(_) => "Failed to process video".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Persistence(_) => "Failed to update video".to_string(),
            AppError::DataIntegrity(_) => "Stored video reference is invalid".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_forbidden() {
        let err = AppError::Forbidden("You don't own this video".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert_eq!(err.client_message(), "You don't own this video");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert_eq!(err.error_type(), "AuthorizationFailure");
    }

    #[test]
    fn test_error_metadata_probe_hides_detail() {
        let err = AppError::Probe("ffprobe exited with status 1: moov atom not found".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "PROBE_FAILED");
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("moov"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_every_pipeline_failure_has_distinct_code() {
        let errors = [
            AppError::Unauthorized(String::new()),
            AppError::Forbidden(String::new()),
            AppError::InvalidInput(String::new()),
            AppError::PayloadTooLarge(String::new()),
            AppError::Staging(String::new()),
            AppError::Probe(String::new()),
            AppError::Remux(String::new()),
            AppError::Storage(String::new()),
            AppError::Persistence(String::new()),
            AppError::DataIntegrity(String::new()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_uuid_error_is_validation_failure() {
        let err: AppError = uuid::Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("disk full").context("writing staged file");
        let err = AppError::from(source);
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
    }
}
