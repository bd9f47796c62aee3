//! Control-Plane Facade (C8, spec.md §4.8).
//!
//! A narrow, cache-friendly read surface onto the config store, which the
//! core treats as an external collaborator (spec.md §1). All operations
//! return a point-in-time snapshot and must be safe to call concurrently;
//! the facade is expected to cache aggressively, the core does not.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Endpoint, Namespace, NamespaceId, Principal, ServerConfig, ServerConfigId};

/// Errors surfaced by a [`ConfigStore`] implementation.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("config store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

/// A change observed on the config store's event stream (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    ServerConfigChanged { id: ServerConfigId, deleted: bool },
    NamespaceChanged { id: NamespaceId },
    EndpointDeleted { name: String },
    ApiKeyRevoked { principal_id: String },
}

/// The narrow read/subscribe interface onto the config store consumed by
/// C2 (fingerprints), C6 (endpoint/auth resolution), and C7 (invalidation).
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_endpoint(&self, name: &str) -> Result<Option<Endpoint>, ConfigStoreError>;

    async fn get_namespace(
        &self,
        id: &NamespaceId,
    ) -> Result<Option<Namespace>, ConfigStoreError>;

    async fn get_server_config(
        &self,
        id: &ServerConfigId,
    ) -> Result<Option<ServerConfig>, ConfigStoreError>;

    /// Validate a raw credential (bearer token or API key) and resolve it
    /// to a principal. Returns `None` for an unknown or revoked credential.
    async fn validate_credential(
        &self,
        raw: &str,
    ) -> Result<Option<Principal>, ConfigStoreError>;

    /// A stream of change events for the Invalidation Bus (C7) to consume.
    /// Implementations fan this out to every subscriber; there is no
    /// replay — a subscriber only sees events emitted after it subscribed.
    async fn subscribe(
        &self,
    ) -> Result<tokio::sync::broadcast::Receiver<ChangeEvent>, ConfigStoreError>;
}
