use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};

use crate::codec::BinaryCodec;
use crate::protocol::error::{MinidubboError, Result};
use crate::protocol::{RemoteError, RemoteErrorKind, Request, Response};
use super::framing::{read_frame, write_frame};

/// Async TCP server for providers.
///
/// Each accepted connection runs on its own task, so one connection's reads
/// and writes are always handled in order. The server never closes a
/// connection on its own after answering; the caller's close ends it.
pub struct TcpServer {
    listener: TcpListener,
}

impl TcpServer {
    /// Creates a new TCP server bound to the specified address.
    ///
    /// # Arguments
    /// * `bind_addr` - The address to bind to (e.g., "0.0.0.0:9001")
    pub async fn new(bind_addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| {
                MinidubboError::Connection(format!("Failed to bind to {}: {}", bind_addr, e))
            })?;

        Ok(Self { listener })
    }

    /// Gets the actual bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| MinidubboError::Connection(format!("Failed to get local addr: {}", e)))
    }

    /// Runs the server with the given request handler until the process ends.
    pub async fn run_with_handler<F, Fut>(&self, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.run_until(handler, std::future::pending()).await
    }

    /// Runs the server until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks; only
    /// the accept loop stops. A failed accept (e.g. the process ran out of
    /// file descriptors) is logged and retried after [`ACCEPT_BACKOFF`].
    pub async fn run_until<F, Fut, S>(&self, handler: F, shutdown: S) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
        S: Future<Output = ()>,
    {
        let listener = &self.listener;
        accept_loop(move || listener.accept(), handler, shutdown).await
    }
}

/// Pause after a failed accept before trying again
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections from `accept` until `shutdown` completes.
pub(crate) async fn accept_loop<A, AFut, F, Fut, S>(
    mut accept: A,
    handler: F,
    shutdown: S,
) -> Result<()>
where
    A: FnMut() -> AFut,
    AFut: Future<Output = io::Result<(TcpStream, SocketAddr)>>,
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
    S: Future<Output = ()>,
{
    let handler = Arc::new(handler);
    tokio::pin!(shutdown);

    loop {
        let accepted = tokio::select! {
            accepted = accept() => accepted,
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, no longer accepting connections");
                return Ok(());
            }
        };

        let (stream, peer_addr) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("Failed to accept connection: {}", e);
                tokio::select! {
                    _ = tokio::time::sleep(ACCEPT_BACKOFF) => continue,
                    _ = &mut shutdown => {
                        tracing::info!("Shutdown requested, no longer accepting connections");
                        return Ok(());
                    }
                }
            }
        };

        tracing::debug!(%peer_addr, "Connection established");

        let handler = handler.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, handler).await {
                // Dropping the stream closes the connection
                tracing::warn!(%peer_addr, "Connection error: {}", e);
            }
        });
    }
}

/// Handle a single TCP connection
///
/// Answers every request frame with one response frame until the peer
/// closes the connection.
async fn handle_connection<F, Fut>(mut stream: TcpStream, handler: Arc<F>) -> Result<()>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    while let Some(frame) = read_frame(&mut stream).await? {
        let response = match BinaryCodec::decode_request(&frame) {
            Ok(request) => handler(request).await,
            Err(e) => {
                tracing::warn!("Failed to decode request: {}", e);
                Response::error(0, RemoteError::new(RemoteErrorKind::BadRequest, e.to_string()))
            }
        };

        let encoded = BinaryCodec::encode_response(&response)?;
        write_frame(&mut stream, &encoded).await?;
    }

    tracing::debug!("Connection closed by peer");
    Ok(())
}
