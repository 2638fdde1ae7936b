use minidubbo_common::Address;

use crate::error::{Result, ServerError};

/// Default listen address: every interface, ephemeral port
pub const DEFAULT_BIND: &str = "0.0.0.0:0";

/// Environment variable overriding the listen address
pub const BIND_ENV: &str = "MINIDUBBO_BIND";

/// Environment variable holding the address published to the registry
pub const ADVERTISE_ENV: &str = "MINIDUBBO_ADVERTISE";

/// Where service methods run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// On the connection's I/O task. A method that blocks holds the whole
    /// runtime worker thread, stalling every other connection scheduled on
    /// that worker until it returns. Use [`DispatchMode::Blocking`] for
    /// methods that block or run long.
    #[default]
    Inline,
    /// On tokio's blocking worker pool, keeping I/O tasks free.
    Blocking,
}

/// Provider server configuration.
///
/// # Default Configuration
///
/// - `bind`: `0.0.0.0:0`
/// - `advertise`: none, derived from the bound address
/// - `dispatch`: [`DispatchMode::Inline`]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Address published to the registry. When unset, the bound address is
    /// used with an unspecified IP replaced by loopback.
    pub advertise: Option<Address>,
    pub dispatch: DispatchMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            advertise: None,
            dispatch: DispatchMode::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(bind: impl Into<String>) -> Self {
        Self::default().with_bind(bind)
    }

    /// Defaults overridden by `MINIDUBBO_BIND` and `MINIDUBBO_ADVERTISE`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(bind) = std::env::var(BIND_ENV) {
            config = config.with_bind(bind.trim());
        }
        if let Ok(advertise) = std::env::var(ADVERTISE_ENV) {
            let address = advertise
                .trim()
                .parse::<Address>()
                .map_err(|e| ServerError::Config(format!("{}: {}", ADVERTISE_ENV, e)))?;
            config = config.with_advertise(address);
        }
        Ok(config)
    }

    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_advertise(mut self, address: Address) -> Self {
        self.advertise = Some(address);
        self
    }

    pub fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch = mode;
        self
    }
}
