//! Downstream Transport Drivers (C1, spec.md §4.1).
//!
//! Exposes one operation that matters to the rest of the core:
//! [`open`], which resolves a [`ServerConfig`] into a live
//! [`DownstreamChannel`] after completing the MCP `initialize` handshake
//! and prefetching the initial catalogs. The three transport variants are
//! grounded directly on the concrete client transports already shipped by
//! `turbomcp-transport`: `ChildProcessTransport` (stdio),
//! `HttpSseClientTransport` (SSE), and `StreamableHttpClientTransport`
//! (streamable-HTTP) — `DownstreamChannel` just adds the single-consumer
//! [`DownstreamRouter`] and the MCP-level handshake/prefetch on top.

pub mod router;

use std::sync::Arc;
use std::time::Duration;

use turbomcp_protocol::jsonrpc::JsonRpcVersion;
use turbomcp_protocol::{
    ClientCapabilities, JsonRpcNotification, JsonRpcRequest, MessageId as RequestId, ServerCapabilities,
    ServerInfo,
};

use turbomcp_transport::{
    ChildProcessConfig, ChildProcessTransport, HttpSseClientConfig, HttpSseClientTransport,
    StreamableHttpClientConfig, StreamableHttpClientTransport, Transport,
};

use crate::error::{GatewayError, GatewayResult};
use crate::model::{ServerConfig, TransportKind};
use router::DownstreamRouter;

/// Default grace period C1 waits for a stdio child to exit on `close()`
/// before forcefully killing it (spec.md §4.1).
pub const STDIO_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A catalog entry as returned by a downstream `tools/list`/`prompts/list`/
/// `resources/list`/`resources/templates/list` call. The Aggregator (C3)
/// re-keys these under exposed names; C1 hands them back verbatim.
#[derive(Debug, Clone)]
pub struct DownstreamCatalog {
    pub tools: Vec<serde_json::Value>,
    pub prompts: Vec<serde_json::Value>,
    pub resources: Vec<serde_json::Value>,
    pub resource_templates: Vec<serde_json::Value>,
    /// Generation number, bumped on every refresh triggered by a
    /// `listChanged` notification.
    pub generation: u64,
}

impl Default for DownstreamCatalog {
    fn default() -> Self {
        Self {
            tools: Vec::new(),
            prompts: Vec::new(),
            resources: Vec::new(),
            resource_templates: Vec::new(),
            generation: 0,
        }
    }
}

/// A live, bidirectional, ordered, reliable channel of JSON-RPC messages to
/// one downstream MCP server, past the `initialize` handshake.
pub struct DownstreamChannel {
    transport: Arc<dyn Transport>,
    router: Arc<DownstreamRouter>,
    pub server_info: ServerInfo,
    pub capabilities: ServerCapabilities,
    next_id: std::sync::atomic::AtomicU64,
    catalog: tokio::sync::Mutex<DownstreamCatalog>,
}

impl std::fmt::Debug for DownstreamChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownstreamChannel")
            .field("server_info", &self.server_info)
            .finish_non_exhaustive()
    }
}

impl DownstreamChannel {
    /// Resolve `config` into a fully handshaken channel (spec.md §4.1).
    pub async fn open(config: &ServerConfig) -> GatewayResult<(Self, DownstreamCatalog)> {
        let transport: Arc<dyn Transport> = match &config.transport {
            TransportKind::Stdio { command, args, env } => {
                let transport = ChildProcessTransport::new(ChildProcessConfig {
                    command: command.clone(),
                    args: args.clone(),
                    working_directory: None,
                    environment: Some(env.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
                    startup_timeout: Duration::from_secs(30),
                    shutdown_timeout: STDIO_SHUTDOWN_GRACE,
                    ..Default::default()
                });
                transport
                    .connect()
                    .await
                    .map_err(|e| GatewayError::upstream_transport(format!("spawn failed: {e}")))?;
                Arc::new(transport)
            }
            TransportKind::Sse { url, bearer_token } => {
                let transport = HttpSseClientTransport::new(HttpSseClientConfig {
                    base_url: url.clone(),
                    auth_token: bearer_token.clone(),
                    ..Default::default()
                });
                transport.connect().await.map_err(|e| {
                    classify_connect_error(e)
                })?;
                Arc::new(transport)
            }
            TransportKind::StreamableHttp { url, bearer_token } => {
                let transport = StreamableHttpClientTransport::new(StreamableHttpClientConfig {
                    base_url: url.clone(),
                    auth_token: bearer_token.clone(),
                    ..Default::default()
                });
                transport.connect().await.map_err(classify_connect_error)?;
                Arc::new(transport)
            }
        };

        let router = DownstreamRouter::new(transport.clone());
        let (server_info, capabilities) = initialize_handshake(&router).await?;
        let channel = Self {
            transport,
            router,
            server_info,
            capabilities,
            next_id: std::sync::atomic::AtomicU64::new(1),
            catalog: tokio::sync::Mutex::new(DownstreamCatalog::default()),
        };
        let catalog = channel.refresh_catalog().await;
        Ok((channel, catalog))
    }

    /// Idempotent; guaranteed to terminate the child/socket within the
    /// configured grace period.
    pub async fn close(&self) {
        let _ = self.transport.disconnect().await;
        self.router.shutdown();
    }

    pub fn router(&self) -> &Arc<DownstreamRouter> {
        &self.router
    }

    pub async fn is_healthy(&self) -> bool {
        self.transport.is_connected().await
    }

    /// Allocate a fresh inner request id, unique to this channel.
    pub fn next_request_id(&self) -> RequestId {
        let n = self.next_id.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        RequestId::from(format!("ds-{n}"))
    }

    pub async fn call(&self, method: &str, params: Option<serde_json::Value>) -> GatewayResult<serde_json::Value> {
        let req = JsonRpcRequest {
            jsonrpc: JsonRpcVersion,
            method: method.to_string(),
            params,
            id: self.next_request_id(),
        };
        let response = self.router.request(req).await?;
        response_to_value(response)
    }

    pub async fn notify(&self, method: &str, params: Option<serde_json::Value>) -> GatewayResult<()> {
        self.router
            .notify(JsonRpcNotification {
                jsonrpc: JsonRpcVersion,
                method: method.to_string(),
                params,
            })
            .await
    }

    /// Best-effort refresh of `tools/list`, `prompts/list`,
    /// `resources/list`, `resources/templates/list`, storing the result as
    /// the channel's cached catalog. Missing capability is not an error
    /// (spec.md §4.1). Called once at `open()` and again by the Aggregator
    /// (C3) whenever a `listChanged` notification marks its cache dirty.
    pub async fn refresh_catalog(&self) -> DownstreamCatalog {
        let tools = self.list_best_effort("tools/list", "tools").await;
        let prompts = self.list_best_effort("prompts/list", "prompts").await;
        let resources = self.list_best_effort("resources/list", "resources").await;
        let resource_templates = self
            .list_best_effort("resources/templates/list", "resourceTemplates")
            .await;
        let mut cached = self.catalog.lock().await;
        cached.generation += 1;
        cached.tools = tools;
        cached.prompts = prompts;
        cached.resources = resources;
        cached.resource_templates = resource_templates;
        cached.clone()
    }

    /// The last catalog fetched by [`Self::refresh_catalog`], without
    /// contacting the downstream.
    pub async fn cached_catalog(&self) -> DownstreamCatalog {
        self.catalog.lock().await.clone()
    }

    async fn list_best_effort(&self, method: &str, key: &str) -> Vec<serde_json::Value> {
        match self.call(method, None).await {
            Ok(value) => value
                .get(key)
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default(),
            Err(e) => {
                tracing::debug!(method, "downstream does not support {key}: {e}");
                Vec::new()
            }
        }
    }
}

fn classify_connect_error(e: turbomcp_transport::TransportError) -> GatewayError {
    let msg = e.to_string();
    if msg.contains("401") || msg.to_lowercase().contains("unauthorized") {
        GatewayError::upstream_unauthorized(msg)
    } else {
        GatewayError::upstream_transport(msg)
    }
}

fn response_to_value(response: turbomcp_protocol::jsonrpc::JsonRpcResponse) -> GatewayResult<serde_json::Value> {
    use turbomcp_protocol::jsonrpc::JsonRpcResponsePayload;
    match response.payload {
        JsonRpcResponsePayload::Success { result } => Ok(result),
        JsonRpcResponsePayload::Error { error } => {
            if error.code == -32001 || error.message.to_lowercase().contains("unauthorized") {
                Err(GatewayError::upstream_unauthorized(error.message))
            } else {
                Err(GatewayError::protocol(error.message))
            }
        }
    }
}

async fn initialize_handshake(
    router: &Arc<DownstreamRouter>,
) -> GatewayResult<(ServerInfo, ServerCapabilities)> {
    let req = JsonRpcRequest {
        jsonrpc: JsonRpcVersion,
        method: "initialize".to_string(),
        params: Some(serde_json::json!({
            "protocolVersion": "2025-06-18",
            "capabilities": ClientCapabilities::default(),
            "clientInfo": { "name": "gateway-core", "version": env!("CARGO_PKG_VERSION") },
        })),
        id: RequestId::from("initialize"),
    };
    let response = router.request(req).await?;
    let result = response_to_value(response)?;

    let server_info: ServerInfo = serde_json::from_value(
        result.get("serverInfo").cloned().unwrap_or_default(),
    )
    .map_err(GatewayError::from)?;
    let capabilities: ServerCapabilities = serde_json::from_value(
        result.get("capabilities").cloned().unwrap_or_default(),
    )
    .unwrap_or_default();

    router
        .notify(JsonRpcNotification {
            jsonrpc: JsonRpcVersion,
            method: "notifications/initialized".to_string(),
            params: None,
        })
        .await?;

    Ok((server_info, capabilities))
}
