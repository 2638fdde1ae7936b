use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::codec::BinaryCodec;
use crate::protocol::error::{MinidubboError, Result};
use crate::protocol::{Address, Request, Response};
use super::framing::{read_frame, write_frame};

/// Default connect timeout (3 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Client transport configuration.
///
/// # Default Configuration
///
/// - `connect_timeout`: 3 seconds
/// - `response_timeout`: none, a call waits for its response indefinitely
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on establishing the TCP connection
    pub connect_timeout: Duration,
    /// Upper bound on waiting for the response once the request is written
    pub response_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            response_timeout: None,
        }
    }
}

impl TransportConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }
}

/// Per-call TCP transport.
///
/// Every [`send`](Self::send) opens a fresh connection, writes one request
/// frame, waits for one response frame and then closes the connection. No
/// state is shared between calls, so concurrent callers can never see each
/// other's responses.
///
/// # Wire Protocol
///
/// ```text
/// [4-byte length] [encoded Request]   ->
///                                     <-   [4-byte length] [encoded Response]
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallTransport {
    config: TransportConfig,
}

impl CallTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Connects to a provider.
    ///
    /// The host is resolved (it may resolve to multiple addresses) and each
    /// candidate is tried until one accepts within the connect timeout.
    pub async fn connect(&self, address: &Address) -> Result<TcpStream> {
        let target = address.to_string();
        let socket_addrs = tokio::net::lookup_host(&target)
            .await
            .map_err(|e| {
                MinidubboError::Connection(format!("Invalid address '{}': {}", target, e))
            })?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            let connect = TcpStream::connect(socket_addr);
            match tokio::time::timeout(self.config.connect_timeout, connect).await {
                Ok(Ok(stream)) => {
                    stream.set_nodelay(true).map_err(|e| {
                        MinidubboError::Connection(format!("Failed to set TCP_NODELAY: {}", e))
                    })?;
                    return Ok(stream);
                }
                Ok(Err(e)) => last_err = Some(e.to_string()),
                Err(_) => {
                    last_err = Some(format!(
                        "timed out after {}ms",
                        self.config.connect_timeout.as_millis()
                    ))
                }
            }
        }

        Err(MinidubboError::Connection(format!(
            "Failed to connect to {}: {}",
            target,
            last_err.unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    /// Sends a request to `address` and waits for its response.
    ///
    /// The connection is closed as soon as the response has been read.
    pub async fn send(&self, address: &Address, request: &Request) -> Result<Response> {
        let mut stream = self.connect(address).await?;
        tracing::debug!(%address, request_id = request.id, "Connected, sending request");

        let exchange = Self::exchange(&mut stream, request);
        let result = match self.config.response_timeout {
            Some(limit) => match tokio::time::timeout(limit, exchange).await {
                Ok(result) => result,
                Err(_) => Err(MinidubboError::Timeout(limit.as_millis() as u64)),
            },
            None => exchange.await,
        };

        // Receiving the response is the completion signal: close either way.
        if let Err(e) = stream.shutdown().await {
            tracing::trace!(%address, "Shutdown after call failed: {}", e);
        }

        let response = result?;
        if response.request_id != request.id {
            tracing::warn!(
                %address,
                expected = request.id,
                received = response.request_id,
                "Response carries a different request id"
            );
        }

        Ok(response)
    }

    async fn exchange(stream: &mut TcpStream, request: &Request) -> Result<Response> {
        let encoded = BinaryCodec::encode_request(request)?;
        write_frame(stream, &encoded).await?;

        let frame = read_frame(stream).await?.ok_or_else(|| {
            MinidubboError::Connection(
                "Provider closed the connection before responding".to_string(),
            )
        })?;

        BinaryCodec::decode_response(&frame)
    }
}
