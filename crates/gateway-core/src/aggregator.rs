//! Namespace Aggregator (C3, spec.md §4.3).
//!
//! One [`Aggregator`] is constructed per Client Session from a
//! [`Namespace`] snapshot. It leases a [`DownstreamSession`] per enabled
//! member from the Session Pool (C2), merges capabilities, builds the
//! disambiguated catalog, and routes inbound MCP requests to the right
//! member while translating ids and exposed names in both directions.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex as AsyncMutex};
use turbomcp_protocol::jsonrpc::{JsonRpcResponsePayload, JsonRpcVersion, ResponseId};
use turbomcp_protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, MessageId as RequestId, ServerCapabilities,
    ServerInfo,
};

use crate::error::{GatewayError, GatewayResult};
use crate::middleware::{self, CatalogEntry, CatalogKind, InterceptOutcome, Middleware};
use crate::model::Namespace;
use crate::pool::{DownstreamSession, SessionPool};

/// Default downstream timeout for `list`-family requests (spec.md §5).
pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default downstream timeout for `call`-family requests and everything
/// else (spec.md §5).
pub const CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-method-class downstream timeouts (spec.md §5, configurable per
/// §6.3's "default request timeouts" environment input). `gateway-cli`
/// builds this from `GatewayConfig` and passes it to every Aggregator it
/// constructs; tests and other embedders can use [`Default`].
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeouts {
    pub list: Duration,
    pub call: Duration,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self { list: LIST_TIMEOUT, call: CALL_TIMEOUT }
    }
}

/// Reason a Client Session should be closed, surfaced by the Aggregator to
/// C5 so it can tear down the outer wire (spec.md §4.5 termination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    ClientClosed,
    StaleConfiguration,
    GlobalShutdown,
}

/// A notification the Aggregator has decided to forward to the outer
/// client, already id-translated where applicable.
#[derive(Debug, Clone)]
pub struct OuterNotification(pub JsonRpcNotification);

struct Member {
    server: crate::model::ServerConfig,
    short_id: String,
    disabled_tools: HashSet<String>,
    session: AsyncMutex<Option<DownstreamSession>>,
    capabilities: ServerCapabilities,
    /// Set whenever [`Aggregator::ensure_member_leased`] fails; cleared on
    /// the next successful lease. Lets a call against a name that vanished
    /// from the catalog because this member is degraded surface the real
    /// cause (spec.md §4.3) instead of a generic tool-not-found.
    last_lease_error: AsyncMutex<Option<Arc<GatewayError>>>,
}

struct CatalogCache {
    entries: Vec<CatalogEntry>,
    name_map: HashMap<String, (usize, String)>,
    dirty: AtomicBool,
}

impl CatalogCache {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            name_map: HashMap::new(),
            dirty: AtomicBool::new(true),
        }
    }
}

/// Pure name-collision resolution for one catalog kind (spec.md §8 invariant
/// 5): the first member to expose a given inner name keeps it bare; every
/// later member colliding on the same name is disambiguated as
/// `<shortId>__<innerName>`. Factored out of [`Aggregator::rebuild_catalog`]
/// so the disambiguation rule itself — independent of fetching or
/// middleware — can be exercised directly.
#[derive(Default)]
struct NameDisambiguator {
    used: HashSet<String>,
    name_map: HashMap<String, (usize, String)>,
}

impl NameDisambiguator {
    /// Feed one member's (index, short id, inner name) in member order;
    /// returns the exposed name to advertise and route by.
    fn expose(&mut self, member_index: usize, short_id: &str, inner_name: &str) -> String {
        let exposed_name = if self.used.insert(inner_name.to_string()) {
            inner_name.to_string()
        } else {
            format!("{short_id}__{inner_name}")
        };
        self.used.insert(exposed_name.clone());
        self.name_map
            .insert(exposed_name.clone(), (member_index, inner_name.to_string()));
        exposed_name
    }
}

/// One aggregated MCP session spanning every enabled member of a
/// [`Namespace`].
pub struct Aggregator {
    namespace_id: String,
    server_info: ServerInfo,
    capabilities: ServerCapabilities,
    members: Vec<Member>,
    chain: Vec<Box<dyn Middleware>>,
    caches: [AsyncMutex<CatalogCache>; 4],
    outer_to_inner: DashMap<RequestId, (usize, RequestId)>,
    inner_to_outer: DashMap<(usize, RequestId), RequestId>,
    outer_notifications: broadcast::Sender<OuterNotification>,
    next_outer_id: AtomicU64,
    pool: Arc<SessionPool>,
    timeouts: RequestTimeouts,
    fanin_tasks: AsyncMutex<Vec<tokio::task::JoinHandle<()>>>,
}

const NOTIFICATION_CAPACITY: usize = 256;

fn kind_index(kind: CatalogKind) -> usize {
    match kind {
        CatalogKind::Tools => 0,
        CatalogKind::Prompts => 1,
        CatalogKind::Resources => 2,
        CatalogKind::ResourceTemplates => 3,
    }
}

fn list_key(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Tools => "tools",
        CatalogKind::Prompts => "prompts",
        CatalogKind::Resources => "resources",
        CatalogKind::ResourceTemplates => "resourceTemplates",
    }
}

impl Aggregator {
    /// Construct an Aggregator from a namespace snapshot: lease every
    /// enabled member (degraded on failure), merge capabilities, build the
    /// catalog, and spawn notification fan-in (spec.md §4.3 steps 1-4).
    pub async fn new(
        namespace: &Namespace,
        pool: Arc<SessionPool>,
        server_info: ServerInfo,
        timeouts: RequestTimeouts,
    ) -> GatewayResult<Arc<Self>> {
        let mut members = Vec::new();
        for member in namespace.enabled_members() {
            let mut lease_error = None;
            let session = match pool.lease(&member.server).await {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(
                        server = %member.server.id,
                        namespace = %namespace.id,
                        "member degraded at aggregator construction: {e}"
                    );
                    lease_error = Some(Arc::new(e));
                    None
                }
            };
            let capabilities = match &session {
                Some(s) => s.channel.capabilities.clone(),
                None => ServerCapabilities::default(),
            };
            members.push(Member {
                server: member.server.clone(),
                short_id: member.server.short_id().to_string(),
                disabled_tools: member.disabled_tools.clone(),
                session: AsyncMutex::new(session),
                capabilities,
                last_lease_error: AsyncMutex::new(lease_error),
            });
        }

        let capabilities = merge_capabilities(&members);
        let chain = middleware::build_chain(&namespace.middleware);
        let (outer_notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        let aggregator = Arc::new(Self {
            namespace_id: namespace.id.clone(),
            server_info,
            capabilities,
            members,
            chain,
            caches: [
                AsyncMutex::new(CatalogCache::empty()),
                AsyncMutex::new(CatalogCache::empty()),
                AsyncMutex::new(CatalogCache::empty()),
                AsyncMutex::new(CatalogCache::empty()),
            ],
            outer_to_inner: DashMap::new(),
            inner_to_outer: DashMap::new(),
            outer_notifications,
            next_outer_id: AtomicU64::new(1),
            pool,
            timeouts,
            fanin_tasks: AsyncMutex::new(Vec::new()),
        });

        aggregator.rebuild_all_catalogs().await;
        aggregator.spawn_fanin().await;
        Ok(aggregator)
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    pub fn subscribe_outer_notifications(&self) -> broadcast::Receiver<OuterNotification> {
        self.outer_notifications.subscribe()
    }

    /// True if any member's lease has gone stale since construction
    /// (spec.md §4.3 stale-lease signal). C5 polls this between requests
    /// and, once true, finishes the in-flight request and closes the
    /// session with [`CloseReason::StaleConfiguration`].
    pub async fn has_stale_lease(&self) -> bool {
        for member in &self.members {
            if let Some(session) = member.session.lock().await.as_ref() {
                let current = self.pool.generation_of(session.fingerprint);
                if session.is_stale(current) {
                    return true;
                }
            }
        }
        false
    }

    /// Return a member's live session, attempting exactly one re-lease if
    /// it is currently degraded (spec.md §4.3 "Degraded behavior" and step
    /// 1's "retried lazily on the next `list` or `call`"). The lease
    /// error, if any, is propagated as-is so an auth failure surfaces as
    /// `Unauthorized` rather than a generic `Unavailable`.
    async fn ensure_member_leased(&self, member_index: usize) -> GatewayResult<DownstreamSession> {
        let member = &self.members[member_index];
        let mut guard = member.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }
        match self.pool.lease(&member.server).await {
            Ok(session) => {
                *guard = Some(session.clone());
                *member.last_lease_error.lock().await = None;
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(
                    server = %member.server.id,
                    namespace = %self.namespace_id,
                    "member re-lease failed: {e}"
                );
                let e = Arc::new(e);
                let reported = e.clone_best_effort();
                *member.last_lease_error.lock().await = Some(e);
                Err(reported)
            }
        }
    }

    /// If a requested name isn't in the catalog and exactly one member is
    /// currently degraded, surface that member's last re-lease error
    /// instead of masking it behind a generic tool-not-found (spec.md
    /// §4.3: a degraded member is retried lazily, and its real cause —
    /// e.g. an expired credential — must reach the caller, not just
    /// "unavailable" or "not found"). Ambiguous with more than one
    /// degraded member, so this only fires for the unambiguous case.
    async fn sole_degraded_member_error(&self) -> Option<GatewayError> {
        let mut degraded = Vec::new();
        for (i, member) in self.members.iter().enumerate() {
            if member.session.lock().await.is_none() {
                degraded.push(i);
            }
        }
        let only = match degraded.as_slice() {
            [only] => *only,
            _ => return None,
        };
        let error = self.members[only].last_lease_error.lock().await;
        error.as_deref().map(GatewayError::clone_best_effort)
    }

    /// A mid-request upstream transport error means the lease is dead
    /// (spec.md §7 point 4: "the lease is marked unhealthy"). Take it out
    /// of the member slot and hand it back to C2 as unreusable — `release`
    /// closes it instead of pooling it and schedules a warmup for its
    /// fingerprint. The next call or list against this member re-leases
    /// lazily, same as any other degraded member.
    async fn evict_member_session(&self, member_index: usize, dead: DownstreamSession) {
        let member = &self.members[member_index];
        let mut guard = member.session.lock().await;
        if guard.as_ref().is_some_and(|current| current.fingerprint == dead.fingerprint) {
            *guard = None;
        }
        drop(guard);
        self.pool.release(dead, false).await;
    }

    /// Dispatch one inbound outer request (spec.md §4.3 "Request routing").
    pub async fn handle_request(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let outer_id = req.id.clone();
        let result = self.dispatch(req).await;
        respond(outer_id, result)
    }

    async fn dispatch(&self, req: JsonRpcRequest) -> GatewayResult<serde_json::Value> {
        match req.method.as_str() {
            "initialize" => Ok(serde_json::json!({
                "protocolVersion": "2025-06-18",
                "capabilities": self.capabilities,
                "serverInfo": self.server_info,
            })),
            "tools/list" => self.serve_list(CatalogKind::Tools).await,
            "prompts/list" => self.serve_list(CatalogKind::Prompts).await,
            "resources/list" => self.serve_list(CatalogKind::Resources).await,
            "resources/templates/list" => self.serve_list(CatalogKind::ResourceTemplates).await,
            "tools/call" => self.dispatch_call(CatalogKind::Tools, req, "name", self.timeouts.call).await,
            "prompts/get" => self.dispatch_call(CatalogKind::Prompts, req, "name", self.timeouts.call).await,
            "resources/read" => self.dispatch_call(CatalogKind::Resources, req, "uri", self.timeouts.call).await,
            other => self.dispatch_passthrough(other, req).await,
        }
    }

    async fn serve_list(&self, kind: CatalogKind) -> GatewayResult<serde_json::Value> {
        let idx = kind_index(kind);
        let dirty = self.caches[idx].lock().await.dirty.load(Ordering::SeqCst);
        if dirty || self.has_degraded_member().await {
            self.rebuild_catalog(kind).await;
        }
        let cache = self.caches[idx].lock().await;
        let items: Vec<serde_json::Value> = cache.entries.iter().map(|e| e.item.clone()).collect();
        Ok(serde_json::json!({ list_key(kind): items }))
    }

    /// Any member currently without a live lease (spec.md §4.3 step 1:
    /// degraded members are retried lazily on the next `list`).
    async fn has_degraded_member(&self) -> bool {
        for member in &self.members {
            if member.session.lock().await.is_none() {
                return true;
            }
        }
        false
    }

    async fn dispatch_call(
        &self,
        kind: CatalogKind,
        req: JsonRpcRequest,
        name_field: &str,
        timeout: Duration,
    ) -> GatewayResult<serde_json::Value> {
        let exposed_name = req
            .params
            .as_ref()
            .and_then(|p| p.get(name_field))
            .and_then(|v| v.as_str())
            .ok_or_else(|| GatewayError::protocol(format!("missing '{name_field}' parameter")))?
            .to_string();

        let idx = kind_index(kind);
        let lookup = |cache: &CatalogCache| {
            let (member_index, inner_name) = cache.name_map.get(&exposed_name).cloned()?;
            let enabled = cache
                .entries
                .iter()
                .find(|e| e.exposed_name == exposed_name)
                .map(|e| e.enabled)
                .unwrap_or(false);
            Some((member_index, inner_name, enabled))
        };

        let mut found = lookup(&self.caches[idx].lock().await);
        if found.is_none() && self.has_degraded_member().await {
            // The name may belong to a member that was degraded when this
            // catalog was last built. Retry the re-lease once before
            // giving up (spec.md §4.3 degraded members are retried
            // lazily, not just on `list`).
            self.rebuild_catalog(kind).await;
            found = lookup(&self.caches[idx].lock().await);
        }
        let (member_index, inner_name, enabled) = match found {
            Some(found) => found,
            None => {
                if let Some(err) = self.sole_degraded_member_error().await {
                    return Err(err);
                }
                return Err(GatewayError::tool_not_found(&exposed_name));
            }
        };

        if let InterceptOutcome::ShortCircuit(result) = middleware::run_intercept_call(&self.chain, &exposed_name, enabled)
        {
            return result;
        }

        let mut params = req.params.clone().unwrap_or(serde_json::json!({}));
        if let Some(obj) = params.as_object_mut() {
            obj.insert(name_field.to_string(), serde_json::json!(inner_name));
        }

        self.forward_to_member(member_index, &req.method, Some(params), req.id, timeout)
            .await
    }

    async fn dispatch_passthrough(&self, method: &str, req: JsonRpcRequest) -> GatewayResult<serde_json::Value> {
        let candidates: Vec<usize> = self
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| advertises(&m.capabilities, method))
            .map(|(i, _)| i)
            .collect();

        let Some(&member_index) = candidates.first() else {
            return Err(GatewayError::method_not_found(method));
        };

        self.forward_to_member(member_index, method, req.params, req.id, self.timeouts.call)
            .await
    }

    async fn forward_to_member(
        &self,
        member_index: usize,
        method: &str,
        params: Option<serde_json::Value>,
        outer_id: RequestId,
        timeout: Duration,
    ) -> GatewayResult<serde_json::Value> {
        let session = self.ensure_member_leased(member_index).await?;
        let channel = session.channel.clone();

        let inner_id = channel.next_request_id();
        let inner_req = JsonRpcRequest {
            jsonrpc: JsonRpcVersion,
            method: method.to_string(),
            params,
            id: inner_id.clone(),
        };

        self.outer_to_inner.insert(outer_id.clone(), (member_index, inner_id.clone()));
        self.inner_to_outer.insert((member_index, inner_id.clone()), outer_id.clone());

        let router = channel.router().clone();
        let response = tokio::time::timeout(timeout, router.request(inner_req)).await;

        self.outer_to_inner.remove(&outer_id);
        self.inner_to_outer.remove(&(member_index, inner_id.clone()));

        match response {
            Ok(Ok(resp)) => match resp.payload {
                JsonRpcResponsePayload::Success { result } => Ok(result),
                JsonRpcResponsePayload::Error { error } => Err(GatewayError::protocol(error.message)),
            },
            Ok(Err(e)) => {
                if matches!(e, GatewayError::UpstreamTransport(_) | GatewayError::Transport(_)) {
                    self.evict_member_session(member_index, session).await;
                }
                Err(e)
            }
            Err(_) => {
                let _ = router
                    .notify(JsonRpcNotification {
                        jsonrpc: JsonRpcVersion,
                        method: "notifications/cancelled".to_string(),
                        params: Some(serde_json::json!({ "requestId": inner_id })),
                    })
                    .await;
                router.abandon(&inner_id);
                Err(GatewayError::timeout(method, timeout.as_millis() as u64))
            }
        }
    }

    /// Propagate an outer `notifications/cancelled` to the mapped
    /// downstream, if any (spec.md §4.3 cancellation).
    pub async fn cancel_outer_request(&self, outer_id: &RequestId) {
        if let Some((_, (member_index, inner_id))) = self.outer_to_inner.remove(outer_id) {
            self.inner_to_outer.remove(&(member_index, inner_id.clone()));
            if let Some(session) = self.members[member_index].session.lock().await.as_ref() {
                let router = session.channel.router().clone();
                let _ = router
                    .notify(JsonRpcNotification {
                        jsonrpc: JsonRpcVersion,
                        method: "notifications/cancelled".to_string(),
                        params: Some(serde_json::json!({ "requestId": inner_id })),
                    })
                    .await;
                router.abandon(&inner_id);
            }
        }
    }

    /// Close every member lease, returning each one to the Session Pool.
    pub async fn close(&self) {
        for handle in self.fanin_tasks.lock().await.drain(..) {
            handle.abort();
        }
        for member in &self.members {
            if let Some(session) = member.session.lock().await.take() {
                self.pool.release(session, true).await;
            }
        }
    }

    async fn rebuild_all_catalogs(&self) {
        for kind in [
            CatalogKind::Tools,
            CatalogKind::Prompts,
            CatalogKind::Resources,
            CatalogKind::ResourceTemplates,
        ] {
            self.rebuild_catalog(kind).await;
        }
    }

    /// Walk every member's prefetched catalog in member order, disambiguate
    /// exposed names, apply the middleware chain (spec.md §4.3 step 3-4).
    async fn rebuild_catalog(&self, kind: CatalogKind) {
        let mut disambiguator = NameDisambiguator::default();
        let mut entries = Vec::new();

        for member_index in 0..self.members.len() {
            let Ok(session) = self.ensure_member_leased(member_index).await else { continue };
            let member = &self.members[member_index];
            let channel = session.channel.clone();
            let fresh = channel.refresh_catalog().await;
            let items = match kind {
                CatalogKind::Tools => fresh.tools,
                CatalogKind::Prompts => fresh.prompts,
                CatalogKind::Resources => fresh.resources,
                CatalogKind::ResourceTemplates => fresh.resource_templates,
            };

            for item in items {
                let Some(inner_name) = item.get("name").or_else(|| item.get("uri")).and_then(|v| v.as_str()) else {
                    continue;
                };
                let inner_name = inner_name.to_string();
                let tool_disabled = kind == CatalogKind::Tools && member.disabled_tools.contains(&inner_name);
                if tool_disabled {
                    continue;
                }

                let exposed_name = disambiguator.expose(member_index, &member.short_id, &inner_name);

                let mut rewritten = item.clone();
                if let Some(obj) = rewritten.as_object_mut() {
                    obj.insert("name".to_string(), serde_json::json!(exposed_name));
                }
                entries.push(CatalogEntry {
                    exposed_name,
                    enabled: true,
                    item: rewritten,
                });
            }
        }

        let entries = middleware::run_transform_catalog(&self.chain, kind, entries);
        let idx = kind_index(kind);
        let mut cache = self.caches[idx].lock().await;
        cache.entries = entries;
        cache.name_map = disambiguator.name_map;
        cache.dirty.store(false, Ordering::SeqCst);
    }

    async fn spawn_fanin(self: &Arc<Self>) {
        let mut handles = Vec::new();
        for (member_index, member) in self.members.iter().enumerate() {
            let Some(session) = member.session.lock().await.as_ref().cloned() else { continue };
            let mut rx = session.channel.router().subscribe_notifications();
            let aggregator = self.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(notification) => aggregator.handle_member_notification(member_index, notification).await,
                        Err(broadcast::error::RecvError::Closed) => break,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
            }));
        }
        *self.fanin_tasks.lock().await = handles;
    }

    /// Translate and forward one downstream notification (spec.md §4.3
    /// notification fan-in table).
    async fn handle_member_notification(&self, member_index: usize, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/tools/listChanged" => self.invalidate_and_emit(CatalogKind::Tools, &notification.method).await,
            "notifications/prompts/listChanged" => self.invalidate_and_emit(CatalogKind::Prompts, &notification.method).await,
            "notifications/resources/listChanged" => self.invalidate_and_emit(CatalogKind::Resources, &notification.method).await,
            "notifications/progress" => {
                let mut params = notification.params.clone();
                if let Some(token) = params.as_ref().and_then(|p| p.get("progressToken")) {
                    if let Some(inner_id) = value_to_request_id(token) {
                        if let Some(outer_id) = self.inner_to_outer.get(&(member_index, inner_id)) {
                            if let Some(obj) = params.as_mut().and_then(|p| p.as_object_mut()) {
                                obj.insert("progressToken".to_string(), request_id_to_value(&outer_id));
                            }
                        }
                    }
                }
                self.emit(JsonRpcNotification { params, ..notification });
            }
            "notifications/stderr" => {
                let mut params = notification.params.clone().unwrap_or(serde_json::json!({}));
                if let Some(obj) = params.as_object_mut() {
                    obj.insert("member".to_string(), serde_json::json!(self.members[member_index].short_id));
                }
                self.emit(JsonRpcNotification {
                    params: Some(params),
                    ..notification
                });
            }
            _ => self.emit(notification),
        }
    }

    async fn invalidate_and_emit(&self, kind: CatalogKind, method: &str) {
        let idx = kind_index(kind);
        let was_dirty = self.caches[idx].lock().await.dirty.swap(true, Ordering::SeqCst);
        if !was_dirty {
            self.emit(JsonRpcNotification {
                jsonrpc: JsonRpcVersion,
                method: method.to_string(),
                params: None,
            });
        }
    }

    fn emit(&self, notification: JsonRpcNotification) {
        let _ = self.outer_notifications.send(OuterNotification(notification));
    }

    /// Allocate a fresh outer request id, used by C5 for server-initiated
    /// requests (not exercised by the core today, but kept symmetric with
    /// C1's `next_request_id`).
    pub fn next_outer_request_id(&self) -> RequestId {
        let n = self.next_outer_id.fetch_add(1, Ordering::Relaxed);
        RequestId::from(format!("{}-{n}", self.namespace_id))
    }
}

fn merge_capabilities(members: &[Member]) -> ServerCapabilities {
    let mut merged = ServerCapabilities::default();
    for member in members {
        if member.capabilities.tools.is_some() {
            merged.tools = member.capabilities.tools.clone();
        }
        if member.capabilities.prompts.is_some() {
            merged.prompts = member.capabilities.prompts.clone();
        }
        if member.capabilities.resources.is_some() {
            merged.resources = member.capabilities.resources.clone();
        }
        if member.capabilities.logging.is_some() {
            merged.logging = member.capabilities.logging.clone();
        }
        if member.capabilities.completions.is_some() {
            merged.completions = member.capabilities.completions.clone();
        }
    }
    merged
}

/// Whether `caps` plausibly handles `method`, used only by passthrough
/// dispatch for methods outside the list/call families this core
/// understands natively.
fn advertises(caps: &ServerCapabilities, method: &str) -> bool {
    if method.starts_with("completion/") {
        return caps.completions.is_some();
    }
    if method.starts_with("logging/") {
        return caps.logging.is_some();
    }
    if method.starts_with("prompts/") {
        return caps.prompts.is_some();
    }
    if method.starts_with("resources/") {
        return caps.resources.is_some();
    }
    if method.starts_with("tools/") {
        return caps.tools.is_some();
    }
    false
}

/// [`GatewayError`] carries no `Clone` impl (its `Transport` variant wraps a
/// non-`Clone` source), so a cached lease error is re-materialized by
/// message rather than cloned structurally. Exact code/kind is preserved;
/// only the `#[from]` source chain is collapsed into the message text.
fn respond(outer_id: RequestId, result: GatewayResult<serde_json::Value>) -> JsonRpcResponse {
    match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Success { result: value },
            id: ResponseId::from_request(outer_id),
        },
        Err(e) => JsonRpcResponse {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Error { error: (&e).into() },
            id: ResponseId::from_request(outer_id),
        },
    }
}

fn value_to_request_id(value: &serde_json::Value) -> Option<RequestId> {
    if let Some(s) = value.as_str() {
        Some(RequestId::from(s))
    } else {
        value.as_i64().map(RequestId::from)
    }
}

fn request_id_to_value(id: &RequestId) -> serde_json::Value {
    serde_json::to_value(id).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn advertises_routes_by_method_prefix() {
        let mut caps = ServerCapabilities::default();
        assert!(!advertises(&caps, "completion/complete"));
        caps.completions = Some(Default::default());
        assert!(advertises(&caps, "completion/complete"));
        assert!(!advertises(&caps, "tools/call"));
    }

    // spec.md §8 invariant 5, scenario S2: two members colliding on `search`
    // expose `search` (A) and `B__search` (B), with the rest untouched.
    #[test]
    fn disambiguates_collision_per_scenario_s2() {
        let mut d = NameDisambiguator::default();
        let search_a = d.expose(0, "A", "search");
        let fetch = d.expose(0, "A", "fetch");
        let search_b = d.expose(1, "B", "search");
        let post = d.expose(1, "B", "post");

        assert_eq!(search_a, "search");
        assert_eq!(fetch, "fetch");
        assert_eq!(search_b, "B__search");
        assert_eq!(post, "post");

        assert_eq!(d.name_map.get("search"), Some(&(0, "search".to_string())));
        assert_eq!(d.name_map.get("B__search"), Some(&(1, "search".to_string())));
    }

    proptest! {
        // spec.md §8 invariant 5: the aggregator exposes exactly two names
        // for a two-way collision (the bare name, and `<shortId>__name` for
        // the later member), and dispatching the exposed name round-trips
        // to the (member, inner name) pair that produced it.
        #[test]
        fn name_disambiguation_round_trips(
            short_ids in prop::collection::hash_set("[a-zA-Z][a-zA-Z0-9]{0,7}", 2..6)
                .prop_map(|s| s.into_iter().collect::<Vec<_>>()),
            inner_name in "[a-z][a-z0-9_]{0,15}",
        ) {
            let mut d = NameDisambiguator::default();
            let mut exposed = Vec::new();
            for (member_index, short_id) in short_ids.iter().enumerate() {
                exposed.push(d.expose(member_index, short_id, &inner_name));
            }

            // Every exposed name is unique.
            let unique: HashSet<&String> = exposed.iter().collect();
            prop_assert_eq!(unique.len(), exposed.len());

            // First member keeps the bare name; every later member is
            // disambiguated with its own short id.
            prop_assert_eq!(&exposed[0], &inner_name);
            for (member_index, short_id) in short_ids.iter().enumerate().skip(1) {
                prop_assert_eq!(&exposed[member_index], &format!("{short_id}__{inner_name}"));
            }

            // Round-trip: dispatch(exposed_name(m, t)) -> (m, t) for every member.
            for (member_index, name) in exposed.iter().enumerate() {
                prop_assert_eq!(d.name_map.get(name), Some(&(member_index, inner_name.clone())));
            }
        }
    }
}
