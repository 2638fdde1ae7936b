use std::sync::Arc;

use minidubbo_common::{
    CallTransport, MinidubboError, Params, Payload, Request, TransportConfig,
};
use minidubbo_registry::{ProviderLocator, RegistryConfig};
use serde::de::DeserializeOwned;

use crate::error::{CallError, Result};
use crate::stub::ServiceProxy;

/// MiniDubbo client for making remote calls.
///
/// Every call resolves a provider through the [`ProviderLocator`] and opens
/// a fresh TCP connection to it, so concurrent calls share nothing but the
/// coordination session. Cloning is cheap.
///
/// # Example
///
/// ```no_run
/// use minidubbo_client::RpcClient;
/// use minidubbo_registry::RegistryConfig;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RpcClient::from_config(RegistryConfig::zookeeper("127.0.0.1:2181"));
/// let reply: String = client.invoke("Echo", "say", ("hi".to_string(),)).await?;
/// assert_eq!(reply, "hi");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RpcClient {
    locator: Arc<ProviderLocator>,
    transport: CallTransport,
}

impl RpcClient {
    pub fn new(locator: ProviderLocator, transport: TransportConfig) -> Self {
        Self {
            locator: Arc::new(locator),
            transport: CallTransport::new(transport),
        }
    }

    /// Client with its own locator session and the default transport settings.
    pub fn from_config(config: RegistryConfig) -> Self {
        Self::new(ProviderLocator::new(config), TransportConfig::default())
    }

    pub fn with_transport_config(mut self, config: TransportConfig) -> Self {
        self.transport = CallTransport::new(config);
        self
    }

    pub fn locator(&self) -> &ProviderLocator {
        &self.locator
    }

    /// Typed handle bound to one interface.
    pub fn proxy(&self, interface: impl Into<String>) -> ServiceProxy {
        ServiceProxy::new(self.clone(), interface)
    }

    /// Calls `interface.method` with `params` and decodes the result as `R`.
    ///
    /// The parameter type descriptors sent to the provider are the element
    /// types of `P`, so they must match the handler's argument tuple exactly.
    pub async fn invoke<P, R>(&self, interface: &str, method: &str, params: P) -> Result<R>
    where
        P: Params,
        R: DeserializeOwned + 'static,
    {
        let request = Request::with_params(interface, method, &params).map_err(CallError::Codec)?;
        let payload = self.invoke_request(request).await?;
        payload.decode::<R>().map_err(CallError::Codec)
    }

    /// Sends a prepared request and returns the encoded result.
    pub async fn invoke_request(&self, request: Request) -> Result<Payload> {
        let Some(address) = self.locator.discover(&request.interface_name).await? else {
            tracing::warn!(interface = %request.interface_name, "No provider available");
            return Err(CallError::ServiceUnavailable {
                interface: request.interface_name,
            });
        };

        tracing::debug!(
            request_id = request.id,
            %address,
            signature = %request.signature(),
            "Invoking remote method"
        );

        let response = match self.transport.send(&address, &request).await {
            Ok(response) => response,
            Err(source) => {
                tracing::warn!(%address, "Call failed in transport: {}", source);
                return Err(CallError::Transport { address, source });
            }
        };

        if let Some(error) = response.error {
            tracing::warn!(signature = %request.signature(), "Remote invocation failed: {}", error);
            return Err(CallError::RemoteInvocationFailed {
                interface: request.interface_name,
                method: request.method_name,
                error,
            });
        }

        response.result.ok_or_else(|| {
            CallError::Codec(MinidubboError::InvalidResponse(
                "Response carries neither result nor error".to_string(),
            ))
        })
    }
}
