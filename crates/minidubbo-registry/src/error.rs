use thiserror::Error;

/// Failures talking to the coordination service.
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("coordination service at {target} did not connect within {timeout_ms}ms")]
    ConnectTimeout { target: String, timeout_ms: u64 },

    #[error("failed to connect to coordination service at {target}: {reason}")]
    Connect { target: String, reason: String },

    #[error("node does not exist: {0}")]
    NoNode(String),

    #[error("node already exists: {0}")]
    NodeExists(String),

    #[error("invalid node path or name: {0}")]
    InvalidPath(String),

    #[error("malformed provider payload at {path}: {reason}")]
    MalformedPayload { path: String, reason: String },

    #[error("coordination backend error: {0}")]
    Backend(String),
}

impl CoordinationError {
    /// True when the session could not be established at all.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            CoordinationError::ConnectTimeout { .. } | CoordinationError::Connect { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoordinationError>;
