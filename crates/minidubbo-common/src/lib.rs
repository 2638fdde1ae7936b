//! MiniDubbo Common Types and Transport
//!
//! This crate provides the protocol definitions, the binary codec and the TCP
//! transport layer shared by every MiniDubbo component.
//!
//! # Overview
//!
//! MiniDubbo is a small remote-procedure-call framework. A caller names an
//! interface and a method, a provider of that interface is located through a
//! coordination service, and the call is shipped over TCP to the provider's
//! dispatcher. This crate holds the pieces both ends agree on:
//!
//! - **Protocol Layer**: [`Address`], [`Request`], [`Response`] and the error taxonomy
//! - **Codec Layer**: [`BinaryCodec`], the per-type [`Schema`] cache and typed [`Params`]
//! - **Transport Layer**: length-prefixed framing, [`CallTransport`] and [`TcpServer`]
//!
//! # Architecture
//!
//! The wire protocol is deliberately simple:
//! - **Transport**: one TCP connection per call, closed by the caller once the
//!   response arrives
//! - **Serialization**: postcard, each value prefixed by its schema fingerprint
//! - **Message Format**: `[4-byte length prefix as u32 big-endian] + [encoded message]`
//! - **Max Message Size**: 16 MiB
//!
//! # Example
//!
//! ```
//! use minidubbo_common::{Request, Response, Payload};
//!
//! let request = Request::with_params("Echo", "say", &("hi".to_string(),)).unwrap();
//! let response = Response::success(request.id, Payload::encode(&"hi".to_string()).unwrap());
//! assert_eq!(response.request_id, request.id);
//! ```

pub mod codec;
pub mod protocol;
pub mod transport;

pub use codec::{schema_of, BinaryCodec, Params, Payload, Schema};
pub use protocol::*;
pub use transport::{CallTransport, TcpServer, TransportConfig};
