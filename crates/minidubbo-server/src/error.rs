use minidubbo_common::MinidubboError;
use minidubbo_registry::CoordinationError;
use thiserror::Error;

/// Failure returned by a service method implementation.
///
/// The message is sent back to the caller inside the response.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ServiceError {
    pub fn failed(message: impl Into<String>) -> Self {
        ServiceError::Failed(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ServiceError::InvalidArgument(message.into())
    }
}

impl From<String> for ServiceError {
    fn from(message: String) -> Self {
        ServiceError::Failed(message)
    }
}

impl From<&str> for ServiceError {
    fn from(message: &str) -> Self {
        ServiceError::Failed(message.to_string())
    }
}

/// Provider startup and serving failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("transport error: {0}")]
    Transport(#[from] MinidubboError),

    #[error("registry error: {0}")]
    Registry(#[from] CoordinationError),

    #[error("duplicate method registration: {0}")]
    DuplicateMethod(String),

    #[error("invalid server configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
