//! MiniDubbo Response Types
//!
//! This module defines the RPC response structure and the failure descriptor
//! a provider sends back when it cannot produce a result.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::Payload;
use super::RequestId;

/// Where on the provider a call failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// No implementation is registered under the requested interface name
    ServiceNotFound,
    /// The interface exists but has no method with that name and signature
    MethodNotFound,
    /// The request or its arguments could not be decoded
    BadRequest,
    /// The implementation returned an error
    Invocation,
    /// The implementation panicked
    Panicked,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteErrorKind::ServiceNotFound => "service not found",
            RemoteErrorKind::MethodNotFound => "method not found",
            RemoteErrorKind::BadRequest => "bad request",
            RemoteErrorKind::Invocation => "invocation failed",
            RemoteErrorKind::Panicked => "implementation panicked",
        };
        f.write_str(name)
    }
}

/// Failure descriptor carried in [`Response::error`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// An RPC response returned from a provider to the caller.
///
/// # Response Flow
///
/// 1. Provider decodes a `Request` from the connection
/// 2. The dispatcher produces exactly one `Response` (result or error)
/// 3. Response is encoded and written back on the same connection
/// 4. Caller decodes it and closes the connection
///
/// # Fields
///
/// - `request_id`: copied from the originating request
/// - `result`: encoded return value (present on success)
/// - `error`: failure descriptor (present on failure)
///
/// # Example
///
/// ```
/// use minidubbo_common::{Payload, RemoteError, RemoteErrorKind, Response};
///
/// let success = Response::success(123, Payload::encode(&42u32).unwrap());
/// assert!(!success.is_error());
///
/// let failure = Response::error(123, RemoteError::new(RemoteErrorKind::Invocation, "boom"));
/// assert!(failure.is_error());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
    /// Request identifier this response corresponds to
    pub request_id: RequestId,
    /// Encoded result value (present on success)
    pub result: Option<Payload>,
    /// Failure descriptor (present on failure)
    pub error: Option<RemoteError>,
}

impl Response {
    /// Creates a successful response.
    pub fn success(request_id: RequestId, result: Payload) -> Self {
        Response {
            request_id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error response.
    pub fn error(request_id: RequestId, error: RemoteError) -> Self {
        Response {
            request_id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
