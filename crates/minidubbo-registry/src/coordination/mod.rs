//! Session wrapper over a hierarchical coordination service.
//!
//! [`CoordinationClient`] opens its session lazily on first use. The connect
//! runs once through an async one-shot cell and is bounded by the configured
//! connect timeout; a failed connect is returned as a typed
//! [`CoordinationError`] and retried on the next operation. Once connected,
//! the session is reused until [`CoordinationClient::close`] or drop.

mod memory;
mod zookeeper;

pub use memory::{MemoryEnsemble, MemorySession};
pub use zookeeper::ZooKeeperSession;

use tokio::sync::OnceCell;

use crate::config::{RegistryConfig, RegistryTarget};
use crate::error::{CoordinationError, Result};

/// Lifetime and naming of a created node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMode {
    /// Survives the creating session
    Persistent,
    /// Removed when the creating session ends
    Ephemeral,
    /// Ephemeral, with a unique increasing suffix appended to the name
    EphemeralSequential,
}

/// An established session on one of the supported backends.
pub enum Session {
    ZooKeeper(ZooKeeperSession),
    Memory(MemorySession),
}

impl Session {
    async fn open(config: &RegistryConfig) -> Result<Self> {
        let session = match &config.target {
            RegistryTarget::ZooKeeper(connect) => {
                let session = ZooKeeperSession::connect(connect, config.connect_timeout).await?;
                Session::ZooKeeper(session)
            }
            RegistryTarget::Memory(ensemble) => Session::Memory(ensemble.connect()),
        };
        tracing::info!(registry = %config.target, "Coordination session established");
        Ok(session)
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        match self {
            Session::ZooKeeper(s) => s.exists(path).await,
            Session::Memory(s) => {
                round_trip().await;
                s.exists(path)
            }
        }
    }

    pub async fn create(&self, path: &str, data: &[u8], mode: NodeMode) -> Result<String> {
        match self {
            Session::ZooKeeper(s) => s.create(path, data, mode).await,
            Session::Memory(s) => {
                round_trip().await;
                s.create(path, data, mode)
            }
        }
    }

    pub async fn children(&self, path: &str) -> Result<Vec<String>> {
        match self {
            Session::ZooKeeper(s) => s.children(path).await,
            Session::Memory(s) => {
                round_trip().await;
                s.children(path)
            }
        }
    }

    pub async fn data(&self, path: &str) -> Result<Vec<u8>> {
        match self {
            Session::ZooKeeper(s) => s.data(path).await,
            Session::Memory(s) => {
                round_trip().await;
                s.data(path)
            }
        }
    }
}

/// Memory operations yield once, like a network round trip, so concurrent
/// callers interleave between operations as they do against ZooKeeper.
async fn round_trip() {
    tokio::task::yield_now().await;
}

/// Lazily connected coordination session.
///
/// # Example
///
/// ```
/// use minidubbo_registry::{CoordinationClient, MemoryEnsemble, NodeMode, RegistryConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CoordinationClient::new(RegistryConfig::memory(MemoryEnsemble::new()));
/// assert!(!client.is_connected());
///
/// client.create("/minidubbo", b"", NodeMode::Persistent).await?;
/// assert!(client.exists("/minidubbo").await?);
/// assert!(client.is_connected());
/// # Ok(())
/// # }
/// ```
pub struct CoordinationClient {
    config: RegistryConfig,
    session: OnceCell<Session>,
}

impl CoordinationClient {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            session: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn root(&self) -> &str {
        &self.config.root
    }

    pub fn is_connected(&self) -> bool {
        self.session.initialized()
    }

    /// Returns the session, connecting first if needed.
    pub async fn session(&self) -> Result<&Session> {
        self.session
            .get_or_try_init(|| async {
                Session::open(&self.config).await.map_err(|e| {
                    tracing::error!(
                        registry = %self.config.target,
                        "Coordination connect failed: {}",
                        e
                    );
                    e
                })
            })
            .await
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        validate_path(path)?;
        self.session().await?.exists(path).await
    }

    /// Creates a node and returns its actual path, which for sequential
    /// nodes includes the generated suffix.
    pub async fn create(&self, path: &str, data: &[u8], mode: NodeMode) -> Result<String> {
        validate_path(path)?;
        self.session().await?.create(path, data, mode).await
    }

    pub async fn children(&self, path: &str) -> Result<Vec<String>> {
        validate_path(path)?;
        self.session().await?.children(path).await
    }

    pub async fn data(&self, path: &str) -> Result<Vec<u8>> {
        validate_path(path)?;
        self.session().await?.data(path).await
    }

    /// Creates `path` and any missing ancestors as empty persistent nodes.
    ///
    /// Losing a creation race to another session counts as success.
    pub async fn ensure_persistent(&self, path: &str) -> Result<()> {
        validate_path(path)?;
        let session = self.session().await?;

        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);

            if session.exists(&current).await? {
                continue;
            }
            match session.create(&current, b"", NodeMode::Persistent).await {
                Ok(_) => tracing::debug!(path = %current, "Created persistent node"),
                Err(CoordinationError::NodeExists(_)) => {
                    tracing::debug!(path = %current, "Persistent node created concurrently")
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Ends the session. Ephemeral nodes it created are removed; the next
    /// operation opens a fresh session.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            tracing::info!(registry = %self.config.target, "Coordination session closed");
        }
    }
}

/// Checks that `path` is absolute with no empty segments.
pub(crate) fn validate_path(path: &str) -> Result<()> {
    if path == "/" {
        return Ok(());
    }
    if !path.starts_with('/') || path.ends_with('/') || path.contains("//") {
        return Err(CoordinationError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Parent of an absolute path; `None` for the root.
pub(crate) fn parent_path(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) if path.len() > 1 => Some("/"),
        Some(0) | None => None,
        Some(idx) => Some(&path[..idx]),
    }
}

/// Joins `parent` and a single child name.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Interface names become one node name: non-empty, no `/`, no control
/// characters, and not `.` or `..`.
pub fn validate_interface_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.chars().any(char::is_control)
    {
        return Err(CoordinationError::InvalidPath(format!(
            "invalid interface name {:?}",
            name
        )));
    }
    Ok(())
}
