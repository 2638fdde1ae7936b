//! MiniDubbo Server
//!
//! The provider side of a remote call.
//!
//! - [`ServiceTable`]: interface name to pre-bound typed method handlers,
//!   built once at startup
//! - [`Dispatcher`]: resolves `(interface, method, parameter types)` and runs
//!   the handler, turning every failure into an error response
//! - [`RpcServer`]: binds the listener, publishes the table's interfaces to
//!   the registry and serves connections

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod server;
pub mod service;

pub use config::{DispatchMode, ServerConfig};
pub use dispatcher::Dispatcher;
pub use error::{Result, ServerError, ServiceError};
pub use server::RpcServer;
pub use service::{ServiceBuilder, ServiceTable, ServiceTableBuilder};
