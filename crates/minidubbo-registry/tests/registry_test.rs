//! Registration and discovery against the in-process ensemble.

use std::collections::HashSet;
use std::time::Duration;

use futures_util::future::join_all;
use minidubbo_common::Address;
use minidubbo_registry::{
    CoordinationClient, CoordinationError, MemoryEnsemble, NodeMode, ProviderLocator,
    ProviderRegistry, RegistryConfig,
};

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_concurrent_registrations_get_unique_nodes() {
    let ensemble = MemoryEnsemble::new();
    const PROVIDERS: u16 = 16;

    let registries: Vec<ProviderRegistry> = (0..PROVIDERS)
        .map(|_| ProviderRegistry::new(RegistryConfig::memory(ensemble.clone())))
        .collect();

    let registrations = registries.iter().enumerate().map(|(i, registry)| async move {
        registry
            .register(&Address::new("127.0.0.1", 9000 + i as u16), "Echo")
            .await
    });
    let paths: Vec<String> = join_all(registrations)
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    let unique: HashSet<&String> = paths.iter().collect();
    assert_eq!(unique.len(), PROVIDERS as usize);
    assert!(paths.iter().all(|p| p.starts_with("/minidubbo/Echo/server")));

    let observer = CoordinationClient::new(RegistryConfig::memory(ensemble.clone()));
    assert_eq!(
        observer.children("/minidubbo/Echo").await.unwrap().len(),
        PROVIDERS as usize
    );

    let locator = ProviderLocator::new(RegistryConfig::memory(ensemble));
    assert_eq!(locator.providers("Echo").await.unwrap().len(), PROVIDERS as usize);
}

#[tokio::test]
async fn test_interface_node_created_concurrently_still_registers() {
    let ensemble = MemoryEnsemble::new();
    let first = ProviderRegistry::new(RegistryConfig::memory(ensemble.clone()));
    let second = ProviderRegistry::new(RegistryConfig::memory(ensemble.clone()));

    // Both sessions see /minidubbo and /minidubbo/Echo missing before either
    // creates them, so one of each pair of creates loses with NodeExists.
    let addr_a = addr("127.0.0.1:9001");
    let addr_b = addr("127.0.0.1:9002");
    let (a, b) = tokio::join!(
        first.register(&addr_a, "Echo"),
        second.register(&addr_b, "Echo"),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a, b);

    let locator = ProviderLocator::new(RegistryConfig::memory(ensemble.clone()));
    let providers: HashSet<Address> =
        locator.providers("Echo").await.unwrap().into_iter().collect();
    assert_eq!(
        providers,
        HashSet::from([addr("127.0.0.1:9001"), addr("127.0.0.1:9002")])
    );
    // "/", "/minidubbo", "/minidubbo/Echo" and two providers
    assert_eq!(ensemble.node_count(), 5);
}

#[tokio::test]
async fn test_discover_follows_provider_lifecycle() {
    let ensemble = MemoryEnsemble::new();
    let locator = ProviderLocator::new(RegistryConfig::memory(ensemble.clone()));

    assert_eq!(locator.discover("Echo").await.unwrap(), None);

    let mut registry = ProviderRegistry::new(RegistryConfig::memory(ensemble.clone()));
    registry.register(&addr("127.0.0.1:9001"), "Echo").await.unwrap();
    assert_eq!(locator.discover("Echo").await.unwrap(), Some(addr("127.0.0.1:9001")));

    registry.close();
    assert_eq!(locator.discover("Echo").await.unwrap(), None);
}

#[tokio::test]
async fn test_discover_falls_back_to_remaining_provider() {
    let ensemble = MemoryEnsemble::new();
    let locator = ProviderLocator::new(RegistryConfig::memory(ensemble.clone()));

    let first = ProviderRegistry::new(RegistryConfig::memory(ensemble.clone()));
    let second = ProviderRegistry::new(RegistryConfig::memory(ensemble.clone()));
    first.register(&addr("127.0.0.1:9001"), "Echo").await.unwrap();
    second.register(&addr("127.0.0.1:9002"), "Echo").await.unwrap();

    // First in listing order wins
    assert_eq!(locator.discover("Echo").await.unwrap(), Some(addr("127.0.0.1:9001")));

    drop(first);
    assert_eq!(locator.discover("Echo").await.unwrap(), Some(addr("127.0.0.1:9002")));
}

#[tokio::test]
async fn test_register_all_and_custom_root() {
    let ensemble = MemoryEnsemble::new();
    let config = RegistryConfig::memory(ensemble.clone()).with_root("/rpc/providers");

    let registry = ProviderRegistry::new(config.clone());
    let paths = registry
        .register_all(&addr("10.0.0.5:7000"), ["Echo", "Math"])
        .await
        .unwrap();
    assert_eq!(
        paths,
        vec![
            "/rpc/providers/Echo/server0000000000".to_string(),
            "/rpc/providers/Math/server0000000000".to_string(),
        ]
    );

    let locator = ProviderLocator::new(config);
    assert_eq!(locator.discover("Math").await.unwrap(), Some(addr("10.0.0.5:7000")));

    // Default root sees nothing
    let other = ProviderLocator::new(RegistryConfig::memory(ensemble));
    assert_eq!(other.discover("Math").await.unwrap(), None);
}

#[tokio::test]
async fn test_malformed_payload_is_an_error() {
    let ensemble = MemoryEnsemble::new();
    let client = CoordinationClient::new(RegistryConfig::memory(ensemble.clone()));
    client.ensure_persistent("/minidubbo/Echo").await.unwrap();
    client
        .create("/minidubbo/Echo/server", b"not-an-address", NodeMode::EphemeralSequential)
        .await
        .unwrap();

    let locator = ProviderLocator::new(RegistryConfig::memory(ensemble));
    let err = locator.discover("Echo").await.unwrap_err();
    assert!(matches!(err, CoordinationError::MalformedPayload { .. }));
}

#[tokio::test]
async fn test_invalid_interface_name_is_rejected() {
    let registry = ProviderRegistry::new(RegistryConfig::memory(MemoryEnsemble::new()));
    let err = registry.register(&addr("127.0.0.1:9001"), "a/b").await.unwrap_err();
    assert!(matches!(err, CoordinationError::InvalidPath(_)));
    assert!(!registry.is_connected());
}

#[tokio::test]
async fn test_unreachable_registry_fails_with_typed_error() {
    let config = RegistryConfig::zookeeper("127.0.0.1:1")
        .with_connect_timeout(Duration::from_millis(300));

    let locator = ProviderLocator::new(config.clone());
    let err = locator.discover("Echo").await.unwrap_err();
    assert!(err.is_connect_failure(), "got {:?}", err);

    let registry = ProviderRegistry::new(config);
    let err = registry.register(&addr("127.0.0.1:9001"), "Echo").await.unwrap_err();
    assert!(err.is_connect_failure(), "got {:?}", err);
}
