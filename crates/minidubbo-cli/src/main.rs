//! # MiniDubbo CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # Serve the demo Echo interface and publish it to ZooKeeper
//! minidubbo --registry 127.0.0.1:2181 provider -b 0.0.0.0:9001
//!
//! # Call it (arguments are sent as strings, the result printed as JSON)
//! minidubbo --registry 127.0.0.1:2181 call Echo say hi
//!
//! # Resolve providers
//! minidubbo --registry 127.0.0.1:2181 discover Echo --all
//! ```
//!
//! Without `--registry`, the `MINIDUBBO_REGISTRY` environment variable is
//! used, then `127.0.0.1:2181`.

use std::time::Duration;

use anyhow::{Context, Result};
use argh::FromArgs;
use minidubbo_client::RpcClient;
use minidubbo_common::Address;
use minidubbo_registry::{ProviderLocator, ProviderRegistry, RegistryConfig};
use minidubbo_server::{DispatchMode, RpcServer, ServerConfig};

#[derive(FromArgs)]
/// MiniDubbo - a minimal RPC framework with registry-based discovery
struct Cli {
    /// zookeeper connect string, e.g. "zk1:2181,zk2:2181"
    #[argh(option, short = 'r')]
    registry: Option<String>,

    /// root node of the provider tree (default "/minidubbo")
    #[argh(option)]
    root: Option<String>,

    /// coordination session connect timeout in milliseconds
    #[argh(option)]
    connect_timeout_ms: Option<u64>,

    /// number of runtime worker threads
    #[argh(option, default = "2")]
    io_threads: usize,

    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Provider(ProviderArgs),
    Call(CallArgs),
    Discover(DiscoverArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "provider")]
/// serve the demo Echo interface and register it
struct ProviderArgs {
    /// address to listen on (default "0.0.0.0:0", or MINIDUBBO_BIND)
    #[argh(option, short = 'b')]
    bind: Option<String>,

    /// address published to the registry, e.g. "10.0.0.5:9001"
    ///
    /// Falls back to MINIDUBBO_ADVERTISE, then to the bound address.
    #[argh(option, short = 'a')]
    advertise: Option<String>,

    /// run methods on the blocking worker pool instead of the I/O tasks
    #[argh(switch)]
    blocking: bool,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// call a method with string arguments and print the string result as JSON
struct CallArgs {
    /// interface name, e.g. "Echo"
    #[argh(positional)]
    interface: String,

    /// method name, e.g. "say"
    #[argh(positional)]
    method: String,

    /// arguments, each sent as a string
    #[argh(positional)]
    args: Vec<String>,

    /// response timeout in milliseconds (waits indefinitely when unset)
    #[argh(option)]
    timeout_ms: Option<u64>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "discover")]
/// resolve an interface to a provider address
struct DiscoverArgs {
    /// interface name
    #[argh(positional)]
    interface: String,

    /// list every live provider instead of the one a caller would pick
    #[argh(switch)]
    all: bool,
}

impl Cli {
    fn registry_config(&self) -> RegistryConfig {
        let mut config = match &self.registry {
            Some(connect) => {
                let env = RegistryConfig::from_env();
                RegistryConfig::zookeeper(connect.clone()).with_root(env.root)
            }
            None => RegistryConfig::from_env(),
        };
        if let Some(root) = &self.root {
            config = config.with_root(root);
        }
        if let Some(ms) = self.connect_timeout_ms {
            config = config.with_connect_timeout(Duration::from_millis(ms));
        }
        config
    }
}

fn init_tracing(default_level: &str) {
    // RUST_LOG overrides the default level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // call/discover print results on stdout; keep their logs to warnings
    match cli.command {
        Commands::Provider(_) => init_tracing("info"),
        Commands::Call(_) | Commands::Discover(_) => init_tracing("warn"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cli.io_threads.max(1))
        .thread_name("minidubbo-io")
        .enable_all()
        .build()
        .context("Failed to build the async runtime")?;

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let registry_config = cli.registry_config();

    match cli.command {
        Commands::Provider(args) => run_provider(args, registry_config).await,
        Commands::Call(args) => run_call(args, registry_config).await,
        Commands::Discover(args) => run_discover(args, registry_config).await,
    }
}

async fn run_provider(args: ProviderArgs, registry_config: RegistryConfig) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = args.bind {
        config = config.with_bind(bind);
    }
    if let Some(advertise) = args.advertise {
        let address: Address = advertise
            .parse()
            .with_context(|| format!("Invalid advertise address {}", advertise))?;
        config = config.with_advertise(address);
    }
    if args.blocking {
        config = config.with_dispatch_mode(DispatchMode::Blocking);
    }

    let table = minidubbo_cli::echo_service_table()?;
    let server = RpcServer::bind(config, table).await?;

    tracing::info!(
        registry = %registry_config.target,
        root = %registry_config.root,
        "Publishing provider"
    );
    let mut registry = ProviderRegistry::new(registry_config);
    for path in server.publish(&registry).await? {
        tracing::info!("Registered {}", path);
    }

    server
        .serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Ctrl-c received, shutting down");
        })
        .await?;

    registry.close();
    Ok(())
}

async fn run_call(args: CallArgs, registry_config: RegistryConfig) -> Result<()> {
    let mut transport = minidubbo_common::TransportConfig::default();
    if let Some(ms) = args.timeout_ms {
        transport = transport.with_response_timeout(Duration::from_millis(ms));
    }

    let client = RpcClient::new(ProviderLocator::new(registry_config), transport);
    let result = minidubbo_cli::invoke_with_strings(
        &client,
        &args.interface,
        &args.method,
        &args.args,
    )
    .await?;

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

async fn run_discover(args: DiscoverArgs, registry_config: RegistryConfig) -> Result<()> {
    let locator = ProviderLocator::new(registry_config);

    let addresses: Vec<String> = if args.all {
        locator
            .providers(&args.interface)
            .await?
            .iter()
            .map(Address::to_string)
            .collect()
    } else {
        match locator.discover(&args.interface).await? {
            Some(address) => vec![address.to_string()],
            None => anyhow::bail!("No provider available for {}", args.interface),
        }
    };

    println!("{}", serde_json::to_string(&addresses)?);
    Ok(())
}
