//! Invalidation Bus (C7, spec.md §4.7).
//!
//! Subscribes to the config store's change stream and translates each
//! event into the actions spec.md §4.7's table names. Multiple events for
//! the same selector within [`COALESCE_WINDOW`] collapse into one
//! trailing-edge flush, mirroring the debounce shape used for the
//! Aggregator's own `listChanged` coalescing (C3).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::facade::{ChangeEvent, ConfigStore, ConfigStoreError};
use crate::model::{Fingerprint, NamespaceId, ServerConfigId};
use crate::pool::{PoolInvalidation, SessionPool};

/// Default coalescing window for same-selector events (spec.md §4.7).
pub const COALESCE_WINDOW: Duration = Duration::from_millis(200);

const SIGNAL_CAPACITY: usize = 256;

/// A signal C5 (and C3, for namespace staleness) subscribes to for the
/// translations the Session Pool alone cannot express: closing sessions by
/// endpoint or principal has no fingerprint to key off of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationSignal {
    NamespaceStale(NamespaceId),
    EndpointDeleted(String),
    PrincipalRevoked(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CoalesceKey {
    ServerConfig(ServerConfigId),
    Namespace(NamespaceId),
    Endpoint(String),
    Principal(String),
}

fn coalesce_key(event: &ChangeEvent) -> CoalesceKey {
    match event {
        ChangeEvent::ServerConfigChanged { id, .. } => CoalesceKey::ServerConfig(id.clone()),
        ChangeEvent::NamespaceChanged { id } => CoalesceKey::Namespace(id.clone()),
        ChangeEvent::EndpointDeleted { name } => CoalesceKey::Endpoint(name.clone()),
        ChangeEvent::ApiKeyRevoked { principal_id } => CoalesceKey::Principal(principal_id.clone()),
    }
}

/// Translates config-store change events into Session Pool invalidations
/// and [`InvalidationSignal`]s for the rest of the core.
pub struct InvalidationBus {
    pool: Arc<SessionPool>,
    config_store: Arc<dyn ConfigStore>,
    /// Last known fingerprint for each server config id, so a
    /// `ServerConfigChanged`/deleted event can invalidate the *old*
    /// fingerprint even after the record itself is gone. Populated by
    /// [`Self::track_fingerprint`], called by whoever resolves a
    /// `ServerConfig` for leasing (the Aggregator, via the gateway's serve
    /// wiring) — spec.md §4.7 requires invalidating the prior fingerprint,
    /// which the config store alone cannot supply once a record is
    /// deleted or replaced.
    fingerprint_cache: DashMap<ServerConfigId, Fingerprint>,
    pending: DashMap<CoalesceKey, ()>,
    latest: DashMap<CoalesceKey, ChangeEvent>,
    signals: broadcast::Sender<InvalidationSignal>,
}

impl InvalidationBus {
    pub fn new(pool: Arc<SessionPool>, config_store: Arc<dyn ConfigStore>) -> Arc<Self> {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Arc::new(Self {
            pool,
            config_store,
            fingerprint_cache: DashMap::new(),
            pending: DashMap::new(),
            latest: DashMap::new(),
            signals,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationSignal> {
        self.signals.subscribe()
    }

    /// Record the fingerprint currently associated with a server config id.
    pub fn track_fingerprint(&self, id: ServerConfigId, fingerprint: Fingerprint) {
        self.fingerprint_cache.insert(id, fingerprint);
    }

    /// Start the bus's run loop: subscribe to the config store and process
    /// events until the store closes its stream. Runs until the returned
    /// handle is aborted or the process exits.
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let bus = self.clone();
        tokio::spawn(async move {
            match bus.config_store.subscribe().await {
                Ok(mut rx) => loop {
                    match rx.recv().await {
                        Ok(event) => bus.on_event(event),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "invalidation bus lagged behind config store stream");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                },
                Err(e) => tracing::error!("invalidation bus failed to subscribe to config store: {e}"),
            }
        })
    }

    fn on_event(self: &Arc<Self>, event: ChangeEvent) {
        let key = coalesce_key(&event);
        self.latest.insert(key.clone(), event);

        if self.pending.insert(key.clone(), ()).is_some() {
            // A flush is already scheduled for this selector; it will pick
            // up the value we just wrote to `latest`.
            return;
        }

        let bus = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(COALESCE_WINDOW).await;
            bus.pending.remove(&key);
            if let Some((_, event)) = bus.latest.remove(&key) {
                bus.apply(event).await;
            }
        });
    }

    async fn apply(&self, event: ChangeEvent) {
        match event {
            ChangeEvent::ServerConfigChanged { id, deleted } => {
                if let Some(fp) = self.fingerprint_cache.get(&id).map(|e| *e) {
                    self.pool.invalidate(PoolInvalidation::Fingerprint(fp));
                }
                if deleted {
                    self.fingerprint_cache.remove(&id);
                }
                // If replaced rather than deleted, the new fingerprint is
                // re-learned the next time something leases this id
                // (spec.md §4.7: "the new fingerprint warms lazily").
            }
            ChangeEvent::NamespaceChanged { id } => {
                self.invalidate_namespace_members(&id).await;
                let _ = self.signals.send(InvalidationSignal::NamespaceStale(id));
            }
            ChangeEvent::EndpointDeleted { name } => {
                let _ = self.signals.send(InvalidationSignal::EndpointDeleted(name));
            }
            ChangeEvent::ApiKeyRevoked { principal_id } => {
                let _ = self.signals.send(InvalidationSignal::PrincipalRevoked(principal_id));
            }
        }
    }

    async fn invalidate_namespace_members(&self, id: &NamespaceId) {
        let namespace = match self.config_store.get_namespace(id).await {
            Ok(Some(ns)) => ns,
            Ok(None) => return, // deleted entirely; nothing left to resolve members for
            Err(e) => {
                tracing::warn!(namespace = %id, "failed to resolve namespace for invalidation: {e}");
                return;
            }
        };
        for member in &namespace.members {
            let fp = member.server.fingerprint();
            self.fingerprint_cache.insert(member.server.id.clone(), fp);
            self.pool.invalidate(PoolInvalidation::Fingerprint(fp));
        }
    }
}

/// In-memory counts by coalesce key, exposed only for tests (not part of
/// the public surface — there is no operational reason to inspect this
/// outside a test).
#[cfg(test)]
fn pending_keys(bus: &InvalidationBus) -> HashMap<CoalesceKey, ChangeEvent> {
    bus.latest.iter().map(|e| (e.key().clone(), e.value().clone())).collect()
}
