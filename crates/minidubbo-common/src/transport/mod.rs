//! MiniDubbo Transport Layer
//!
//! This module provides the TCP transport used on both sides of a call.
//!
//! # Architecture
//!
//! - **Framing**: `[4-byte length prefix as u32 big-endian] + [encoded message]`,
//!   identical in both directions
//! - **Client**: [`CallTransport`] opens one connection per call, writes one
//!   request frame, reads one response frame and closes the connection
//! - **Server**: [`TcpServer`] accepts connections and runs each one on its own
//!   task, answering every request frame with exactly one response frame
//!
//! Concurrent calls never share a connection, so responses cannot be
//! interleaved and no request-id correlation table is needed.
//!
//! # Example
//!
//! ```no_run
//! use minidubbo_common::transport::CallTransport;
//! use minidubbo_common::{Address, Request};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = CallTransport::default();
//! let address: Address = "127.0.0.1:9001".parse()?;
//!
//! let request = Request::with_params("Echo", "say", &("hi".to_string(),))?;
//! let response = transport.send(&address, &request).await?;
//! # Ok(())
//! # }
//! ```

pub mod framing;
pub mod tcp;
pub mod tcp_server;

pub use framing::{read_frame, write_frame, MAX_FRAME_SIZE};
pub use tcp::{CallTransport, TransportConfig};
pub use tcp_server::TcpServer;

#[cfg(test)]
mod tests;
