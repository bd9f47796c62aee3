//! Core of an MCP aggregating gateway: downstream transport drivers (C1),
//! session pooling (C2), namespace aggregation (C3), middleware (C4), the
//! client session manager (C5), the endpoint dispatcher (C6), and the
//! invalidation bus (C7). Everything here is HTTP-framework-agnostic;
//! `gateway-cli` supplies the wire front (SSE/Streamable-HTTP framing,
//! axum extraction) on top of [`endpoint::resolve`] and
//! [`session::ClientSessionManager`]. The config store (C8) is consumed
//! through the [`facade::ConfigStore`] trait and implemented separately by
//! `gateway-config-store` — this crate treats it as an external
//! collaborator.

pub mod aggregator;
pub mod endpoint;
pub mod error;
pub mod facade;
pub mod invalidation;
pub mod middleware;
pub mod model;
pub mod pool;
pub mod session;
pub mod transport;

pub use aggregator::{Aggregator, CloseReason, OuterNotification, RequestTimeouts};
pub use endpoint::{Credential, Dispatch, DispatchError, WireShape};
pub use error::{GatewayError, GatewayResult};
pub use facade::{ChangeEvent, ConfigStore, ConfigStoreError};
pub use invalidation::{InvalidationBus, InvalidationSignal};
pub use model::{
    AuthPolicy, Endpoint, Fingerprint, MiddlewareSpec, Namespace, NamespaceId, NamespaceMember, Principal,
    ServerConfig, ServerConfigId, TargetSelector, TransportKind,
};
pub use pool::{DownstreamSession, PoolInvalidation, SessionPool};
pub use session::{ClientSession, ClientSessionManager, SessionId, STALE_LEASE_POLL_INTERVAL};
pub use transport::{DownstreamCatalog, DownstreamChannel};
