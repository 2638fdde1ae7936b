//! MiniDubbo Client
//!
//! The caller side of a remote call: resolve a provider for the interface,
//! ship the request over a fresh TCP connection and map the response to a
//! value or a [`CallError`].
//!
//! - [`RpcClient::invoke`] is the generic entry point
//! - [`ServiceProxy`] binds a client to one interface
//! - [`remote_interface!`] generates typed stubs on top of a proxy

pub mod client;
pub mod error;
pub mod stub;

pub use client::RpcClient;
pub use error::{CallError, Result};
pub use stub::ServiceProxy;
