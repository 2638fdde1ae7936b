use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use minidubbo_common::{Address, TcpServer};
use minidubbo_registry::ProviderRegistry;

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::service::ServiceTable;

/// A provider: a bound listener plus the dispatcher for its service table.
///
/// # Example
///
/// ```no_run
/// use minidubbo_registry::{ProviderRegistry, RegistryConfig};
/// use minidubbo_server::{RpcServer, ServerConfig, ServiceError, ServiceTable};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = ServiceTable::builder()
///     .service("Echo", |svc| svc.method("say", |(m,): (String,)| Ok::<_, ServiceError>(m)))
///     .build()?;
///
/// let server = RpcServer::bind(ServerConfig::new("0.0.0.0:9001"), table).await?;
/// let registry = ProviderRegistry::new(RegistryConfig::from_env());
/// server.publish(&registry).await?;
/// server.serve().await?;
/// # Ok(())
/// # }
/// ```
pub struct RpcServer {
    server: TcpServer,
    dispatcher: Dispatcher,
    advertised: Address,
}

impl RpcServer {
    /// Binds the listener. Nothing is accepted until [`serve`](Self::serve).
    pub async fn bind(config: ServerConfig, table: ServiceTable) -> Result<Self> {
        let server = TcpServer::new(&config.bind).await?;
        let local_addr = server.local_addr()?;

        let advertised = match config.advertise {
            Some(address) => address,
            None => advertised_for(local_addr),
        };

        tracing::info!(
            %local_addr,
            %advertised,
            interfaces = ?table.interfaces(),
            dispatch = ?config.dispatch,
            "Provider bound"
        );

        Ok(Self {
            server,
            dispatcher: Dispatcher::new(Arc::new(table)).with_mode(config.dispatch),
            advertised,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.local_addr()?)
    }

    /// Address published to the registry.
    pub fn advertised_address(&self) -> &Address {
        &self.advertised
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Registers every interface in the service table under the advertised
    /// address. The registrations last as long as `registry`'s session.
    pub async fn publish(&self, registry: &ProviderRegistry) -> Result<Vec<String>> {
        let interfaces = self.dispatcher.table().interfaces();
        Ok(registry.register_all(&self.advertised, interfaces).await?)
    }

    /// Serves until the process ends.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serves until `shutdown` completes. Connections already accepted are
    /// left to finish on their own tasks.
    pub async fn serve_with_shutdown<S>(self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        tracing::info!(advertised = %self.advertised, "Provider serving");

        let dispatcher = self.dispatcher.clone();
        self.server
            .run_until(
                move |request| {
                    let dispatcher = dispatcher.clone();
                    async move { dispatcher.handle(request).await }
                },
                shutdown,
            )
            .await?;

        tracing::info!(advertised = %self.advertised, "Provider stopped");
        Ok(())
    }
}

/// Callers cannot connect to an unspecified IP, so fall back to loopback.
fn advertised_for(local_addr: SocketAddr) -> Address {
    let ip = match local_addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        _ => return Address::from(local_addr),
    };
    tracing::warn!(
        %local_addr,
        "Bound to an unspecified address, advertising loopback; \
         set an advertise address for remote callers"
    );
    Address::from(SocketAddr::new(ip, local_addr.port()))
}
