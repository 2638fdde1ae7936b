//! MiniDubbo Provider Registry
//!
//! Provider registration and discovery on top of a hierarchical,
//! session-oriented coordination service.
//!
//! # Tree Layout
//!
//! ```text
//! /minidubbo                         persistent
//! └── <interface>                    persistent
//!     ├── server0000000000           ephemeral-sequential, payload "host:port"
//!     └── server0000000001
//! ```
//!
//! Provider nodes are tied to the registering session, so a provider that
//! exits or loses its session disappears from discovery without any
//! heartbeat logic.
//!
//! # Backends
//!
//! - **ZooKeeper**: a real ensemble through `zookeeper-client`
//! - **Memory**: [`MemoryEnsemble`], an in-process tree with the same
//!   ephemeral and sequential semantics, used by tests and single-process
//!   setups

pub mod config;
pub mod coordination;
pub mod error;
pub mod locator;
pub mod registry;

pub use config::{RegistryConfig, RegistryTarget};
pub use coordination::{CoordinationClient, MemoryEnsemble, NodeMode};
pub use error::{CoordinationError, Result};
pub use locator::ProviderLocator;
pub use registry::ProviderRegistry;
