use minidubbo_common::{Address, MinidubboError, RemoteError};
use minidubbo_registry::CoordinationError;
use thiserror::Error;

/// Outcome of a remote call that did not produce a value.
///
/// `ServiceUnavailable` and `RemoteInvocationFailed` are distinct on purpose:
/// the first means no provider was found, the second means a provider ran
/// the call and reported a failure.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("no provider available for interface {interface}")]
    ServiceUnavailable { interface: String },

    #[error("remote invocation of {interface}.{method} failed: {error}")]
    RemoteInvocationFailed {
        interface: String,
        method: String,
        #[source]
        error: RemoteError,
    },

    #[error("transport failure calling {address}: {source}")]
    Transport {
        address: Address,
        #[source]
        source: MinidubboError,
    },

    #[error("coordination failure: {0}")]
    Coordination(#[from] CoordinationError),

    #[error("codec failure: {0}")]
    Codec(#[source] MinidubboError),
}

impl CallError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CallError::ServiceUnavailable { .. })
    }

    /// The provider-side failure, when the call reached a provider.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            CallError::RemoteInvocationFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CallError>;
