//! Binary codec for MiniDubbo values and messages.
//!
//! Values are encoded with postcard, a compact format that is not
//! self-describing: the reader must know the target type. To make a type
//! mismatch an error instead of garbage, every encoded value starts with the
//! 8-byte little-endian fingerprint of its [`Schema`]:
//!
//! ```text
//! [8-byte schema fingerprint (LE)] [postcard body]
//! ```

mod params;
mod schema;

pub use params::Params;
pub use schema::{cached_schemas, fingerprint, schema_of, Schema};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::protocol::error::{MinidubboError, Result};
use crate::protocol::{Request, Response};

const FINGERPRINT_LEN: usize = 8;

/// Binary codec for encoding/decoding typed values and RPC messages.
///
/// # Example
///
/// ```
/// use minidubbo_common::codec::BinaryCodec;
/// use minidubbo_common::Request;
///
/// let request = Request::with_params("Echo", "say", &("hello".to_string(),)).unwrap();
/// let encoded = BinaryCodec::encode_request(&request).unwrap();
/// let decoded = BinaryCodec::decode_request(&encoded).unwrap();
/// assert_eq!(request, decoded);
/// ```
pub struct BinaryCodec;

impl BinaryCodec {
    /// Encodes any serializable value, stamped with its schema fingerprint.
    pub fn encode<T: Serialize + 'static>(value: &T) -> Result<Vec<u8>> {
        let schema = schema_of::<T>();
        let body = postcard::to_allocvec(value)?;

        let mut out = Vec::with_capacity(FINGERPRINT_LEN + body.len());
        out.extend_from_slice(&schema.fingerprint().to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decodes a value previously produced by [`BinaryCodec::encode`] for the same type.
    pub fn decode<T: DeserializeOwned + 'static>(data: &[u8]) -> Result<T> {
        if data.len() < FINGERPRINT_LEN {
            return Err(MinidubboError::MalformedPayload(format!(
                "{} bytes is shorter than the schema fingerprint",
                data.len()
            )));
        }

        let (head, body) = data.split_at(FINGERPRINT_LEN);
        let mut fingerprint = [0u8; FINGERPRINT_LEN];
        fingerprint.copy_from_slice(head);
        let found = u64::from_le_bytes(fingerprint);

        let schema = schema_of::<T>();
        if found != schema.fingerprint() {
            return Err(MinidubboError::SchemaMismatch {
                expected: schema.type_name(),
                expected_fingerprint: schema.fingerprint(),
                found,
            });
        }

        Ok(postcard::from_bytes(body)?)
    }

    pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
        Self::encode(request)
    }

    pub fn decode_request(data: &[u8]) -> Result<Request> {
        Self::decode(data)
    }

    pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
        Self::encode(response)
    }

    pub fn decode_response(data: &[u8]) -> Result<Response> {
        Self::decode(data)
    }
}

/// One encoded value: a call argument or a return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn encode<T: Serialize + 'static>(value: &T) -> Result<Self> {
        BinaryCodec::encode(value).map(Payload)
    }

    pub fn decode<T: DeserializeOwned + 'static>(&self) -> Result<T> {
        BinaryCodec::decode(&self.0)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Payload(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
