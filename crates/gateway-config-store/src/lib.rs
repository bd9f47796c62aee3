//! Control-Plane Facade (C8, spec.md §4.8): the [`ConfigStore`] trait is
//! defined in `gateway-core`; this crate supplies the in-memory reference
//! implementation the gateway ships with, plus the bulk import/export
//! format of spec.md §6.2.
//!
//! The facade is expected to cache aggressively and the core does not —
//! here that means every read is a `DashMap` lookup against state already
//! resident in memory; a deployment backed by a real database would
//! implement the same trait with its own caching layer in front.

pub mod import_export;

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

use gateway_core::facade::{ChangeEvent, ConfigStore, ConfigStoreError};
use gateway_core::model::{Endpoint, Namespace, NamespaceId, Principal, ServerConfig, ServerConfigId};

const CHANGE_CAPACITY: usize = 256;

/// One registered credential: the raw secret it was minted as, and the
/// principal it resolves to.
#[derive(Debug, Clone)]
struct Credential {
    principal: Principal,
}

/// In-memory [`ConfigStore`]: four `DashMap` tables plus a broadcast
/// channel for change events. Every mutation method emits the
/// corresponding [`ChangeEvent`] after applying the change, matching
/// spec.md §4.7's "a subscriber only sees events emitted after it
/// subscribed" — there is no replay.
pub struct InMemoryConfigStore {
    endpoints: DashMap<String, Endpoint>,
    namespaces: DashMap<NamespaceId, Namespace>,
    server_configs: DashMap<ServerConfigId, ServerConfig>,
    credentials: DashMap<String, Credential>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            endpoints: DashMap::new(),
            namespaces: DashMap::new(),
            server_configs: DashMap::new(),
            credentials: DashMap::new(),
            changes,
        }
    }

    /// Insert or replace an endpoint. Endpoint changes have no dedicated
    /// `ChangeEvent` variant in spec.md §4.7's table (only deletion does)
    /// — a live Client Session only cares about an endpoint disappearing
    /// out from under it, not a policy edit, which takes effect on the
    /// next dispatch.
    pub fn put_endpoint(&self, endpoint: Endpoint) {
        self.endpoints.insert(endpoint.name.clone(), endpoint);
    }

    pub fn delete_endpoint(&self, name: &str) -> bool {
        let existed = self.endpoints.remove(name).is_some();
        if existed {
            let _ = self.changes.send(ChangeEvent::EndpointDeleted { name: name.to_string() });
        }
        existed
    }

    pub fn put_namespace(&self, namespace: Namespace) {
        let id = namespace.id.clone();
        self.namespaces.insert(id.clone(), namespace);
        let _ = self.changes.send(ChangeEvent::NamespaceChanged { id });
    }

    pub fn delete_namespace(&self, id: &NamespaceId) -> bool {
        let existed = self.namespaces.remove(id).is_some();
        if existed {
            let _ = self.changes.send(ChangeEvent::NamespaceChanged { id: id.clone() });
        }
        existed
    }

    /// Insert a server config only if `id` is unused. Returns `false`
    /// (without mutating anything) on a name collision — the caller
    /// (bulk import) is expected to surface that as a per-entry error.
    pub fn insert_server_config(&self, config: ServerConfig) -> bool {
        let id = config.id.clone();
        let inserted = match self.server_configs.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(config);
                true
            }
            dashmap::mapref::entry::Entry::Occupied(_) => false,
        };
        if inserted {
            let _ = self.changes.send(ChangeEvent::ServerConfigChanged { id, deleted: false });
        }
        inserted
    }

    /// Replace an existing server config (no collision check; used for
    /// edits rather than import). No-op, returns `false`, if `id` is
    /// unknown.
    pub fn replace_server_config(&self, config: ServerConfig) -> bool {
        let id = config.id.clone();
        if !self.server_configs.contains_key(&id) {
            return false;
        }
        self.server_configs.insert(id.clone(), config);
        let _ = self.changes.send(ChangeEvent::ServerConfigChanged { id, deleted: false });
        true
    }

    pub fn delete_server_config(&self, id: &ServerConfigId) -> bool {
        let existed = self.server_configs.remove(id).is_some();
        if existed {
            let _ = self.changes.send(ChangeEvent::ServerConfigChanged { id: id.clone(), deleted: true });
        }
        existed
    }

    pub fn list_server_configs(&self) -> Vec<ServerConfig> {
        self.server_configs.iter().map(|e| e.value().clone()).collect()
    }

    /// Register `raw` as a valid credential resolving to `principal`.
    pub fn add_credential(&self, raw: String, principal: Principal) {
        self.credentials.insert(raw, Credential { principal });
    }

    /// Revoke every credential belonging to `principal_id`, emitting one
    /// `ApiKeyRevoked` event regardless of how many keys that principal
    /// held (spec.md §4.7: "close every Client Session whose principal is
    /// that key").
    pub fn revoke_principal(&self, principal_id: &str) {
        self.credentials.retain(|_, cred| cred.principal.id != principal_id);
        let _ = self.changes.send(ChangeEvent::ApiKeyRevoked { principal_id: principal_id.to_string() });
    }
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_endpoint(&self, name: &str) -> Result<Option<Endpoint>, ConfigStoreError> {
        Ok(self.endpoints.get(name).map(|e| e.value().clone()))
    }

    async fn get_namespace(&self, id: &NamespaceId) -> Result<Option<Namespace>, ConfigStoreError> {
        Ok(self.namespaces.get(id).map(|e| e.value().clone()))
    }

    async fn get_server_config(&self, id: &ServerConfigId) -> Result<Option<ServerConfig>, ConfigStoreError> {
        Ok(self.server_configs.get(id).map(|e| e.value().clone()))
    }

    async fn validate_credential(&self, raw: &str) -> Result<Option<Principal>, ConfigStoreError> {
        Ok(self.credentials.get(raw).map(|e| e.value().principal.clone()))
    }

    async fn subscribe(&self) -> Result<broadcast::Receiver<ChangeEvent>, ConfigStoreError> {
        Ok(self.changes.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::model::{AuthPolicy, TransportKind};

    fn config(id: &str) -> ServerConfig {
        ServerConfig {
            id: id.to_string(),
            transport: TransportKind::Stdio { command: "true".to_string(), args: vec![], env: HashMap::new() },
            description: None,
        }
    }

    #[tokio::test]
    async fn get_endpoint_reflects_put() {
        let store = InMemoryConfigStore::new();
        store.put_endpoint(Endpoint { name: "demo".to_string(), namespace: "ns".to_string(), auth: AuthPolicy::Public });
        assert!(store.get_endpoint("demo").await.unwrap().is_some());
        assert!(store.get_endpoint("missing").await.unwrap().is_none());
    }

    #[test]
    fn insert_server_config_rejects_name_collision() {
        let store = InMemoryConfigStore::new();
        assert!(store.insert_server_config(config("srv-1")));
        assert!(!store.insert_server_config(config("srv-1")));
        assert_eq!(store.list_server_configs().len(), 1);
    }

    #[tokio::test]
    async fn revoking_a_principal_emits_one_signal_for_all_its_keys() {
        let store = InMemoryConfigStore::new();
        let alice = Principal { id: "alice".to_string(), owner: Some("alice".to_string()), is_public_key: false };
        store.add_credential("key-1".to_string(), alice.clone());
        store.add_credential("key-2".to_string(), alice);
        let mut rx = store.subscribe().await.unwrap();

        store.revoke_principal("alice");

        assert!(store.validate_credential("key-1").await.unwrap().is_none());
        assert!(store.validate_credential("key-2").await.unwrap().is_none());
        let event = rx.recv().await.unwrap();
        assert_eq!(event, ChangeEvent::ApiKeyRevoked { principal_id: "alice".to_string() });
    }
}
