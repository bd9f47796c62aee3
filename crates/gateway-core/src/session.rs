//! Client Session Manager (C5, spec.md §4.5).
//!
//! Framework-agnostic, like C6: a [`ClientSession`] is a session id, an
//! [`Aggregator`], and the bookkeeping needed to close it. The outer wire
//! shape (SSE framing vs. Streamable-HTTP framing) lives entirely in
//! `gateway-cli`; this module never reads a header or writes a response
//! body. Grounded on `turbomcp-transport`'s `SessionManager`/`SessionInfo`
//! (last-activity timestamp, `is_expired(timeout)`, periodic sweep).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use turbomcp_protocol::{JsonRpcRequest, JsonRpcResponse};
use uuid::Uuid;

use crate::aggregator::{Aggregator, CloseReason};
use crate::invalidation::InvalidationSignal;
use crate::model::{NamespaceId, Principal};

pub type SessionId = String;

/// Poll interval C5 uses to re-check every live session's
/// `has_stale_lease` between requests (spec.md §4.3 stale-lease signal,
/// the complement to the Invalidation Bus's immediate push).
pub const STALE_LEASE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// One live outer-wire session: the endpoint it was opened against, the
/// principal behind it (`None` for an unauthenticated public endpoint),
/// and the Aggregator doing the work.
pub struct ClientSession {
    pub id: SessionId,
    pub endpoint: String,
    pub namespace: NamespaceId,
    pub principal: Option<Principal>,
    pub aggregator: Arc<Aggregator>,
    created_at: Instant,
    last_activity: Mutex<Instant>,
    in_flight: AtomicU64,
}

impl ClientSession {
    fn new(endpoint: String, namespace: NamespaceId, principal: Option<Principal>, aggregator: Arc<Aggregator>) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4().to_string(),
            endpoint,
            namespace,
            principal,
            aggregator,
            created_at: now,
            last_activity: Mutex::new(now),
            in_flight: AtomicU64::new(0),
        }
    }

    /// Record that a frame was seen on the outer wire (spec.md §4.5 idle
    /// timeout is measured from the last one).
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn is_idle(&self, timeout: Duration) -> bool {
        self.last_activity.lock().elapsed() > timeout
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Is this session's principal (if any) the one being revoked?
    fn belongs_to_principal(&self, principal_id: &str) -> bool {
        self.principal.as_ref().is_some_and(|p| p.id == principal_id)
    }

    /// Dispatch one outer request through the Aggregator, tracked as
    /// in-flight for the duration so a concurrent close (spec.md §4.3
    /// "completes any in-flight request... then closes") waits for it.
    pub async fn handle(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let response = self.aggregator.handle_request(req).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }

    /// Block until no request is in flight on this session. Bounded in
    /// practice by the Aggregator's own per-request timeouts.
    async fn drain(&self) {
        while self.in_flight.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

/// Tracks every live [`ClientSession`] and closes it on any of the triggers
/// spec.md §4.5 names: client close, `exit`, Aggregator-initiated stale
/// close, global shutdown, or idle timeout.
pub struct ClientSessionManager {
    sessions: DashMap<SessionId, Arc<ClientSession>>,
    /// Default disabled (`None`), per spec.md §4.5 — configurable by
    /// deployment.
    idle_timeout: Option<Duration>,
}

impl ClientSessionManager {
    pub fn new(idle_timeout: Option<Duration>) -> Arc<Self> {
        Arc::new(Self { sessions: DashMap::new(), idle_timeout })
    }

    /// Register a freshly constructed Aggregator as a new Client Session
    /// and return it. The caller (C6, via `gateway-cli`) has already
    /// resolved {endpoint, principal} and built the Aggregator from the
    /// endpoint's namespace.
    pub fn create(
        &self,
        endpoint: String,
        namespace: NamespaceId,
        principal: Option<Principal>,
        aggregator: Arc<Aggregator>,
    ) -> Arc<ClientSession> {
        let session = Arc::new(ClientSession::new(endpoint, namespace, principal, aggregator));
        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    pub fn get(&self, id: &str) -> Option<Arc<ClientSession>> {
        self.sessions.get(id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Tear down one session: let any in-flight request complete first
    /// (spec.md §4.3 "completes any in-flight request on that lease, then
    /// proactively closes"), then close its Aggregator (returns every
    /// lease to C2) and drop it from the table. Idempotent — closing an id
    /// that is no longer present, or one removed by a racing call while we
    /// drained, is a no-op.
    pub async fn close(&self, id: &str, reason: CloseReason) {
        let Some(session) = self.sessions.get(id).map(|e| e.value().clone()) else { return };
        session.drain().await;
        if self.sessions.remove(id).is_some() {
            tracing::debug!(session = %session.id, ?reason, "closing client session");
            session.aggregator.close().await;
        }
    }

    /// Global shutdown: close every live session (spec.md §4.5).
    pub async fn close_all(&self, reason: CloseReason) {
        let ids: Vec<SessionId> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.close(&id, reason).await;
        }
    }

    /// Close every session past the configured idle timeout. A no-op when
    /// no timeout is configured. Intended to be driven by a periodic task
    /// in `gateway-cli`.
    pub async fn sweep_idle(&self) {
        let Some(timeout) = self.idle_timeout else { return };
        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|e| e.value().is_idle(timeout))
            .map(|e| e.key().clone())
            .collect();
        for id in expired {
            self.close(&id, CloseReason::ClientClosed).await;
        }
    }

    /// Close every session whose Aggregator reports a stale lease (spec.md
    /// §4.3 stale-lease signal). The push-based [`InvalidationSignal::NamespaceStale`]
    /// covers the same case faster; this sweep is the poll-based backstop
    /// for the common case where the bus's signal arrived while a request
    /// was still in flight elsewhere, or before a session's aggregator
    /// even existed. Intended to be driven by a periodic task in
    /// `gateway-cli`, the same way [`Self::sweep_idle`] is.
    pub async fn sweep_stale(&self) {
        let ids: Vec<SessionId> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            let Some(session) = self.sessions.get(&id).map(|e| e.value().clone()) else { continue };
            if session.aggregator.has_stale_lease().await {
                self.close(&id, CloseReason::StaleConfiguration).await;
            }
        }
    }

    /// Subscribe to the Invalidation Bus and close sessions matching each
    /// signal: every session on a deleted endpoint, every session whose
    /// principal was revoked, and every session of a namespace gone stale
    /// (spec.md §4.7's table, the push-based complement to the Aggregator
    /// polling its own `has_stale_lease` between requests).
    pub fn spawn_invalidation_listener(
        self: &Arc<Self>,
        mut signals: tokio::sync::broadcast::Receiver<InvalidationSignal>,
    ) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(InvalidationSignal::EndpointDeleted(name)) => {
                        manager.close_matching(CloseReason::StaleConfiguration, |s| s.endpoint == name).await;
                    }
                    Ok(InvalidationSignal::NamespaceStale(id)) => {
                        manager.close_matching(CloseReason::StaleConfiguration, |s| s.namespace == id).await;
                    }
                    Ok(InvalidationSignal::PrincipalRevoked(principal_id)) => {
                        manager
                            .close_matching(CloseReason::StaleConfiguration, |s| s.belongs_to_principal(&principal_id))
                            .await;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "client session manager lagged behind invalidation bus");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn close_matching(&self, reason: CloseReason, predicate: impl Fn(&ClientSession) -> bool) {
        let ids: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|e| predicate(e.value()))
            .map(|e| e.key().clone())
            .collect();
        for id in ids {
            self.close(&id, reason).await;
        }
    }
}
