use minidubbo_common::Address;

use crate::config::RegistryConfig;
use crate::coordination::{child_path, validate_interface_name, CoordinationClient, NodeMode};
use crate::error::Result;

/// Publishes "interface X is served at address Y".
///
/// Each registration is an ephemeral-sequential node
/// `<root>/<interface>/<prefix><seq>` whose payload is the UTF-8
/// `host:port` of the provider. The root and interface nodes are persistent.
/// Registrations live as long as this registry's session: call
/// [`close`](Self::close) or drop the registry to withdraw them.
///
/// # Example
///
/// ```
/// use minidubbo_common::Address;
/// use minidubbo_registry::{MemoryEnsemble, ProviderRegistry, RegistryConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = ProviderRegistry::new(RegistryConfig::memory(MemoryEnsemble::new()));
/// let path = registry.register(&"127.0.0.1:9001".parse::<Address>()?, "Echo").await?;
/// assert_eq!(path, "/minidubbo/Echo/server0000000000");
/// # Ok(())
/// # }
/// ```
pub struct ProviderRegistry {
    client: CoordinationClient,
}

impl ProviderRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            client: CoordinationClient::new(config),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        self.client.config()
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Registers `address` as a provider of `interface` and returns the
    /// created node path.
    pub async fn register(&self, address: &Address, interface: &str) -> Result<String> {
        validate_interface_name(interface)?;

        let interface_path = child_path(self.client.root(), interface);
        // Covers the root too; persistent creation races are harmless
        self.client.ensure_persistent(&interface_path).await?;

        let provider_path = child_path(&interface_path, &self.config().provider_prefix);
        let payload = address.to_string();
        let created = self
            .client
            .create(&provider_path, payload.as_bytes(), NodeMode::EphemeralSequential)
            .await
            .map_err(|e| {
                tracing::error!(interface, %address, "Provider registration failed: {}", e);
                e
            })?;

        tracing::info!(interface, %address, path = %created, "Provider registered");
        Ok(created)
    }

    /// Registers `address` for every interface in `interfaces`, stopping at
    /// the first failure.
    pub async fn register_all<I, S>(&self, address: &Address, interfaces: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut paths = Vec::new();
        for interface in interfaces {
            paths.push(self.register(address, interface.as_ref()).await?);
        }
        Ok(paths)
    }

    /// Ends the registration session; every provider node it created goes
    /// away.
    pub fn close(&mut self) {
        self.client.close();
    }
}
