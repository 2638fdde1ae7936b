use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinidubboError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] postcard::Error),

    #[error("Schema mismatch: expected {expected} (fingerprint {expected_fingerprint:#018x}), found fingerprint {found:#018x}")]
    SchemaMismatch {
        expected: &'static str,
        expected_fingerprint: u64,
        found: u64,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, MinidubboError>;
