use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use crate::codec::{Params, Payload};
use super::error::Result;

pub type RequestId = u64;

/// Fully qualified name of a parameter type, as produced by [`crate::Schema`].
pub type TypeDescriptor = String;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A remote call: which operation to run and with which arguments.
///
/// `(interface_name, method_name, parameter_types)` identifies the target
/// operation on the provider. `parameters` holds one codec-encoded
/// [`Payload`] per argument, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub id: RequestId,
    pub interface_name: String,
    pub method_name: String,
    pub parameter_types: Vec<TypeDescriptor>,
    pub parameters: Vec<Payload>,
}

impl Request {
    pub fn new(
        interface_name: impl Into<String>,
        method_name: impl Into<String>,
        parameter_types: Vec<TypeDescriptor>,
        parameters: Vec<Payload>,
    ) -> Self {
        Request {
            id: generate_request_id(),
            interface_name: interface_name.into(),
            method_name: method_name.into(),
            parameter_types,
            parameters,
        }
    }

    /// Builds a request from a typed argument tuple.
    ///
    /// Parameter types are taken from the tuple's element types and each
    /// element is encoded separately.
    pub fn with_params<P: Params>(
        interface_name: impl Into<String>,
        method_name: impl Into<String>,
        params: &P,
    ) -> Result<Self> {
        Ok(Self::new(
            interface_name,
            method_name,
            P::descriptors(),
            params.encode()?,
        ))
    }

    /// Human readable operation signature, e.g. `Echo.say(alloc::string::String)`.
    pub fn signature(&self) -> String {
        format!(
            "{}.{}({})",
            self.interface_name,
            self.method_name,
            self.parameter_types.join(", ")
        )
    }
}

fn generate_request_id() -> RequestId {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst);

    // Upper 32 bits from the clock, lower 32 bits from the counter
    (timestamp & 0xFFFFFFFF00000000) | (counter & 0xFFFFFFFF)
}
