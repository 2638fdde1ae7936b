//! Typed client stubs.
//!
//! A [`ServiceProxy`] binds an interface name to an [`RpcClient`].
//! [`remote_interface!`](crate::remote_interface) generates a struct whose
//! methods forward to the proxy, so callers write `echo.say(msg).await`
//! instead of naming the method as a string.

use std::sync::Arc;

use minidubbo_common::Params;
use serde::de::DeserializeOwned;

use crate::client::RpcClient;
use crate::error::Result;

/// An [`RpcClient`] bound to one interface.
#[derive(Clone)]
pub struct ServiceProxy {
    client: RpcClient,
    interface: Arc<str>,
}

impl ServiceProxy {
    pub fn new(client: RpcClient, interface: impl Into<String>) -> Self {
        Self {
            client,
            interface: Arc::from(interface.into()),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Params,
        R: DeserializeOwned + 'static,
    {
        self.client.invoke(&self.interface, method, params).await
    }
}

/// Generates a typed stub for a remote interface.
///
/// Each declared method becomes an `async fn` that sends its arguments as a
/// tuple, in declaration order, and decodes the declared return type.
///
/// # Example
///
/// ```no_run
/// use minidubbo_client::{remote_interface, RpcClient};
/// use minidubbo_registry::RegistryConfig;
///
/// remote_interface! {
///     /// Client side of the demo echo service.
///     pub struct EchoClient as "Echo" {
///         fn say(message: String) -> String;
///         fn repeat(message: String, times: u32) -> Vec<String>;
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RpcClient::from_config(RegistryConfig::from_env());
/// let echo = EchoClient::new(&client);
/// let reply = echo.say("hi".to_string()).await?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! remote_interface {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident as $interface:literal {
            $(
                $(#[$method_meta:meta])*
                fn $method:ident ( $($arg:ident : $ty:ty),* $(,)? ) -> $ret:ty ;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            proxy: $crate::ServiceProxy,
        }

        impl $name {
            /// Interface name providers register under.
            pub const INTERFACE: &'static str = $interface;

            pub fn new(client: &$crate::RpcClient) -> Self {
                Self {
                    proxy: client.proxy($interface),
                }
            }

            pub fn proxy(&self) -> &$crate::ServiceProxy {
                &self.proxy
            }

            $(
                $(#[$method_meta])*
                pub async fn $method(
                    &self,
                    $($arg: $ty),*
                ) -> ::std::result::Result<$ret, $crate::CallError> {
                    self.proxy.call(stringify!($method), ($($arg,)*)).await
                }
            )*
        }
    };
}
