//! Integration coverage for `InMemoryConfigStore` driven entirely through
//! the public `ConfigStore` trait object, the way C7 (Invalidation Bus)
//! and C6 (Endpoint Dispatcher) actually consume it — as opposed to the
//! crate's inline unit tests, which call the inherent `put_*`/`delete_*`
//! methods directly.

use std::collections::HashMap;
use std::sync::Arc;

use gateway_core::facade::{ChangeEvent, ConfigStore};
use gateway_core::model::{AuthPolicy, Endpoint, Namespace, Principal, ServerConfig, TransportKind};
use gateway_config_store::InMemoryConfigStore;

fn stdio_config(id: &str) -> ServerConfig {
    ServerConfig {
        id: id.to_string(),
        transport: TransportKind::Stdio { command: "true".to_string(), args: vec![], env: HashMap::new() },
        description: None,
    }
}

#[tokio::test]
async fn lifecycle_through_the_trait_object_matches_direct_calls() {
    let concrete = Arc::new(InMemoryConfigStore::new());
    let store: Arc<dyn ConfigStore> = concrete.clone();

    concrete.put_endpoint(Endpoint { name: "demo".to_string(), namespace: "ns".to_string(), auth: AuthPolicy::Public });

    assert_eq!(store.get_endpoint("demo").await.unwrap().map(|e| e.name), Some("demo".to_string()));
    assert!(store.get_endpoint("missing").await.unwrap().is_none());
    assert!(store.get_namespace(&"ns".to_string()).await.unwrap().is_none());
}

/// A subscriber only sees events emitted after it subscribed (spec.md
/// §4.7) — the reference implementation's `broadcast::Sender` gives this
/// for free, but it's a named invariant worth pinning down directly
/// rather than trusting incidentally.
#[tokio::test]
async fn subscriber_misses_events_emitted_before_it_subscribed() {
    let store = InMemoryConfigStore::new();
    store.insert_server_config(stdio_config("before"));

    let mut rx = store.subscribe().await.unwrap();
    store.insert_server_config(stdio_config("after"));

    let event = rx.recv().await.unwrap();
    assert_eq!(event, ChangeEvent::ServerConfigChanged { id: "after".to_string(), deleted: false });
}

/// Deleting a server config, then re-registering the same id, produces
/// two distinct change events in order — the id alone does not
/// disambiguate them, `deleted` does.
#[tokio::test]
async fn delete_then_recreate_emits_deleted_then_live_events_in_order() {
    let store = InMemoryConfigStore::new();
    store.insert_server_config(stdio_config("srv"));
    let mut rx = store.subscribe().await.unwrap();

    assert!(store.delete_server_config(&"srv".to_string()));
    assert!(store.insert_server_config(stdio_config("srv")));

    assert_eq!(rx.recv().await.unwrap(), ChangeEvent::ServerConfigChanged { id: "srv".to_string(), deleted: true });
    assert_eq!(rx.recv().await.unwrap(), ChangeEvent::ServerConfigChanged { id: "srv".to_string(), deleted: false });
}

/// Revoking a principal invalidates every credential it owns, observable
/// only through `validate_credential` returning `None` — the store
/// never exposes the raw credential table itself.
#[tokio::test]
async fn revoked_principal_credentials_are_rejected_across_multiple_keys() {
    let store = InMemoryConfigStore::new();
    let bob = Principal { id: "bob".to_string(), owner: Some("bob".to_string()), is_public_key: false };
    store.add_credential("bob-key-a".to_string(), bob.clone());
    store.add_credential("bob-key-b".to_string(), bob);

    assert!(store.validate_credential("bob-key-a").await.unwrap().is_some());

    store.revoke_principal("bob");

    assert!(store.validate_credential("bob-key-a").await.unwrap().is_none());
    assert!(store.validate_credential("bob-key-b").await.unwrap().is_none());
}

/// Deleting an endpoint that was never registered is a no-op and must
/// not emit a change event — only a real deletion does.
#[tokio::test]
async fn deleting_an_unknown_endpoint_emits_nothing() {
    let store = InMemoryConfigStore::new();
    let mut rx = store.subscribe().await.unwrap();

    assert!(!store.delete_endpoint("ghost"));

    store.put_namespace(Namespace { id: "ns".to_string(), members: vec![], middleware: vec![] });
    let event = rx.recv().await.unwrap();
    assert_eq!(event, ChangeEvent::NamespaceChanged { id: "ns".to_string() });
}

/// Namespace puts and deletes both round-trip through `get_namespace`
/// and both emit `NamespaceChanged`, matching `put_endpoint`'s asymmetry
/// note in the crate docs: namespaces, unlike endpoints, signal on every
/// edit, not only on deletion.
#[tokio::test]
async fn namespace_put_and_delete_round_trip_and_signal() {
    let store = InMemoryConfigStore::new();
    let ns = Namespace { id: "team-a".to_string(), members: vec![], middleware: vec![] };
    let mut rx = store.subscribe().await.unwrap();

    store.put_namespace(ns.clone());
    assert!(store.get_namespace(&ns.id).await.unwrap().is_some());
    assert_eq!(rx.recv().await.unwrap(), ChangeEvent::NamespaceChanged { id: ns.id.clone() });

    assert!(store.delete_namespace(&ns.id));
    assert!(store.get_namespace(&ns.id).await.unwrap().is_none());
    assert_eq!(rx.recv().await.unwrap(), ChangeEvent::NamespaceChanged { id: ns.id.clone() });
}
