use std::process::ExitStatus;

/// Failures of the external media tools.
#[derive(Debug, thiserror::Error)]
pub enum MediaToolError {
    #[error("Invalid tool path: {0}")]
    InvalidToolPath(String),

    #[error("Invalid media path: {0}")]
    InvalidPath(String),

    #[error("Failed to execute {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Failed to parse {tool} output: {message}")]
    InvalidOutput { tool: &'static str, message: String },
}

impl MediaToolError {
    pub fn failed(tool: &'static str, status: ExitStatus, stderr: &[u8]) -> Self {
        MediaToolError::Failed {
            tool,
            status: status.to_string(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

/// Failures of the local scratch area.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Failed to create staging file in {dir}: {source}")]
    Create {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write staging file: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to read staging file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Staging dir {dir} cannot be passed to media tools: {reason}")]
    UnusableDir { dir: String, reason: String },

    #[error("Failed to take ownership of {path}: {source}")]
    Adopt {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
