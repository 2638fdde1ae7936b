use std::fmt;
use std::time::Duration;

use crate::coordination::MemoryEnsemble;

/// Default coordination tree root
pub const DEFAULT_ROOT: &str = "/minidubbo";

/// Default ZooKeeper connect string
pub const DEFAULT_CONNECT_STRING: &str = "127.0.0.1:2181";

/// Default session connect timeout (5 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Name prefix of provider nodes; the service appends the sequence suffix
pub const DEFAULT_PROVIDER_PREFIX: &str = "server";

/// Environment variable holding the ZooKeeper connect string
pub const REGISTRY_ENV: &str = "MINIDUBBO_REGISTRY";

/// Environment variable overriding the tree root
pub const ROOT_ENV: &str = "MINIDUBBO_ROOT";

/// Which coordination service a session talks to.
#[derive(Debug, Clone)]
pub enum RegistryTarget {
    /// A ZooKeeper ensemble, e.g. `"zk1:2181,zk2:2181"`
    ZooKeeper(String),
    /// An in-process ensemble shared by clones of the handle
    Memory(MemoryEnsemble),
}

impl fmt::Display for RegistryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryTarget::ZooKeeper(connect) => write!(f, "zookeeper://{}", connect),
            RegistryTarget::Memory(_) => f.write_str("memory://"),
        }
    }
}

/// Registry and locator configuration.
///
/// # Default Configuration
///
/// - `target`: ZooKeeper at `127.0.0.1:2181`
/// - `root`: `/minidubbo`
/// - `connect_timeout`: 5 seconds
/// - `provider_prefix`: `server`
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use minidubbo_registry::{MemoryEnsemble, RegistryConfig};
///
/// let config = RegistryConfig::memory(MemoryEnsemble::new())
///     .with_root("/rpc")
///     .with_connect_timeout(Duration::from_secs(1));
/// assert_eq!(config.root, "/rpc");
/// ```
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub target: RegistryTarget,
    /// Persistent root node; interface nodes live directly below it
    pub root: String,
    /// Upper bound on establishing the coordination session
    pub connect_timeout: Duration,
    /// Name prefix for ephemeral-sequential provider nodes
    pub provider_prefix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(RegistryTarget::ZooKeeper(DEFAULT_CONNECT_STRING.to_string()))
    }
}

impl RegistryConfig {
    pub fn new(target: RegistryTarget) -> Self {
        Self {
            target,
            root: DEFAULT_ROOT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            provider_prefix: DEFAULT_PROVIDER_PREFIX.to_string(),
        }
    }

    pub fn zookeeper(connect_string: impl Into<String>) -> Self {
        Self::new(RegistryTarget::ZooKeeper(connect_string.into()))
    }

    pub fn memory(ensemble: MemoryEnsemble) -> Self {
        Self::new(RegistryTarget::Memory(ensemble))
    }

    /// Builds a ZooKeeper configuration from `MINIDUBBO_REGISTRY` and
    /// `MINIDUBBO_ROOT`, falling back to the defaults for unset variables.
    pub fn from_env() -> Self {
        let mut config = match std::env::var(REGISTRY_ENV) {
            Ok(connect) if !connect.trim().is_empty() => Self::zookeeper(connect.trim()),
            _ => Self::default(),
        };
        if let Ok(root) = std::env::var(ROOT_ENV) {
            if !root.trim().is_empty() {
                config = config.with_root(root.trim());
            }
        }
        config
    }

    /// Sets the tree root. A missing leading `/` is added and trailing ones
    /// are dropped.
    pub fn with_root(mut self, root: impl AsRef<str>) -> Self {
        let trimmed = root.as_ref().trim_end_matches('/');
        self.root = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_provider_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.provider_prefix = prefix.into();
        self
    }
}
