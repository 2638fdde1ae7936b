use minidubbo_common::Address;

use crate::config::RegistryConfig;
use crate::coordination::{child_path, validate_interface_name, CoordinationClient};
use crate::error::{CoordinationError, Result};

/// Resolves an interface name to a live provider address.
///
/// Every lookup goes to the coordination service; nothing is cached. Lookup
/// failures other than a failed session connect are logged and reported as
/// "no provider".
pub struct ProviderLocator {
    client: CoordinationClient,
}

impl ProviderLocator {
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

    /// Returns one live provider of `interface`, or `None` when there is none.
    ///
    /// The first provider in listing order is chosen. A provider whose node
    /// vanishes between listing and reading is skipped.
    ///
    /// # Errors
    ///
    /// Fails when the session cannot be established, the name is invalid, or a
    /// provider node holds something other than `host:port`.
    pub async fn discover(&self, interface: &str) -> Result<Option<Address>> {
        validate_interface_name(interface)?;
        let interface_path = child_path(self.client.root(), interface);

        let children = match self.recover(interface, self.client.children(&interface_path).await)? {
            Some(children) => children,
            None => return Ok(None),
        };

        for child in children {
            let path = child_path(&interface_path, &child);
            if let Some(address) = self.read_provider(interface, &path).await? {
                tracing::debug!(interface, %address, "Provider discovered");
                return Ok(Some(address));
            }
        }

        tracing::debug!(interface, "No live provider");
        Ok(None)
    }

    /// All live providers of `interface` in listing order.
    pub async fn providers(&self, interface: &str) -> Result<Vec<Address>> {
        validate_interface_name(interface)?;
        let interface_path = child_path(self.client.root(), interface);

        let children = self
            .recover(interface, self.client.children(&interface_path).await)?
            .unwrap_or_default();

        let mut addresses = Vec::with_capacity(children.len());
        for child in children {
            let path = child_path(&interface_path, &child);
            if let Some(address) = self.read_provider(interface, &path).await? {
                addresses.push(address);
            }
        }
        Ok(addresses)
    }

    async fn read_provider(&self, interface: &str, path: &str) -> Result<Option<Address>> {
        let data = match self.recover(interface, self.client.data(path).await)? {
            Some(data) => data,
            None => return Ok(None),
        };

        let text = String::from_utf8(data).map_err(|e| CoordinationError::MalformedPayload {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let address = text
            .parse::<Address>()
            .map_err(|e| CoordinationError::MalformedPayload {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(address))
    }

    /// Maps node-level failures to "absent"; only connect failures propagate.
    fn recover<T>(&self, interface: &str, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_connect_failure() => Err(e),
            Err(CoordinationError::NoNode(path)) => {
                tracing::debug!(interface, %path, "Node not found");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(interface, "Provider lookup failed: {}", e);
                Ok(None)
            }
        }
    }
}
