//! # MiniDubbo CLI
//!
//! Command-line interface for MiniDubbo.
//!
//! - `minidubbo provider`: serve the demo [`Echo`](echo::Echo) interface and
//!   publish it to the registry
//! - `minidubbo call`: call a method with string arguments and print the
//!   string result as JSON
//! - `minidubbo discover`: resolve an interface to provider addresses
//!
//! Arguments parsed by `argh`; the registry comes from `MINIDUBBO_REGISTRY`
//! and `MINIDUBBO_ROOT` unless overridden by flags.

pub mod echo;

pub use echo::{echo_service_table, EchoClient, ECHO_INTERFACE};

use minidubbo_client::{CallError, RpcClient};

/// Largest number of string arguments `call` accepts
pub const MAX_STRING_ARGS: usize = 4;

/// Invokes `interface.method` with every argument sent as a `String` and
/// decodes the result as a `String`.
///
/// The parameter signature is `(String, ..)` with one element per argument,
/// so this reaches any method whose parameters are all strings.
pub async fn invoke_with_strings(
    client: &RpcClient,
    interface: &str,
    method: &str,
    args: &[String],
) -> anyhow::Result<String> {
    let result: Result<String, CallError> = match args {
        [] => client.invoke(interface, method, ()).await,
        [a] => client.invoke(interface, method, (a.clone(),)).await,
        [a, b] => client.invoke(interface, method, (a.clone(), b.clone())).await,
        [a, b, c] => {
            client
                .invoke(interface, method, (a.clone(), b.clone(), c.clone()))
                .await
        }
        [a, b, c, d] => {
            client
                .invoke(interface, method, (a.clone(), b.clone(), c.clone(), d.clone()))
                .await
        }
        _ => anyhow::bail!(
            "at most {} arguments are supported, got {}",
            MAX_STRING_ARGS,
            args.len()
        ),
    };
    Ok(result?)
}
