//! Gateway error taxonomy (spec.md §7).
//!
//! Mirrors the shape of `turbomcp-proxy::error::ProxyError`: a flat
//! `thiserror` enum, a `sanitize()` that never leaks internal detail across
//! the outer wire, an `is_retryable()` classification, and bidirectional
//! conversion with `turbomcp_protocol`'s JSON-RPC error type so a
//! `GatewayError` can always be turned into a response the outer client
//! understands.

use thiserror::Error;
use turbomcp_protocol::jsonrpc::JsonRpcError;

/// Result type for gateway-core operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// The eight error kinds of spec.md §7, as a flat enum rather than a
/// wrapped "kind" field — each variant already carries exactly the
/// context its kind needs.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GatewayError {
    /// 1. Malformed JSON-RPC, unknown method. Never fatal.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// 2. Unknown endpoint, unknown tool/prompt/resource name.
    #[error("not found: {0}")]
    Routing(String),

    /// 3. Missing, invalid, or forbidden credential.
    #[error("auth error: {0}")]
    Auth(String),

    /// 4. Downstream process died, socket closed, TLS/HTTP failure.
    #[error("upstream transport error: {0}")]
    UpstreamTransport(String),

    /// 5. 401 from a downstream remote MCP server.
    #[error("upstream authorization error: {0}")]
    UpstreamAuthorization(String),

    /// 6. A request exceeded its method-class timeout.
    #[error("timeout: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// 7. A lease or session observed a stale configuration generation.
    /// Never returned as a request error — always resolved by closing the
    /// session (spec.md §4.3, §4.7).
    #[error("stale configuration: {0}")]
    StaleConfiguration(String),

    /// 8. Pool at capacity, file descriptors, memory.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A downstream's JSON-RPC response could not be parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Passed through unchanged from the transport layer.
    #[error("transport error: {0}")]
    Transport(#[from] turbomcp_transport::TransportError),
}

impl GatewayError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub fn routing(message: impl Into<String>) -> Self {
        Self::Routing(message.into())
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::Routing(format!("method not found: {}", method.into()))
    }

    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::Routing(format!("tool not found: {}", name.into()))
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn upstream_transport(message: impl Into<String>) -> Self {
        Self::UpstreamTransport(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamTransport(message.into())
    }

    pub fn upstream_unauthorized(message: impl Into<String>) -> Self {
        Self::UpstreamAuthorization(message.into())
    }

    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn stale_configuration(message: impl Into<String>) -> Self {
        Self::StaleConfiguration(message.into())
    }

    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Self::ResourceExhausted(message.into())
    }

    /// Strip internal detail before this error crosses the outer wire.
    pub fn sanitize(&self) -> String {
        match self {
            Self::Protocol(_) => "protocol error".to_string(),
            Self::Routing(msg) => msg.clone(), // routing errors are already client-safe (names the missing entity)
            Self::Auth(_) => "authentication failed".to_string(),
            Self::UpstreamTransport(_) => "upstream unavailable".to_string(),
            Self::UpstreamAuthorization(_) => "upstream authorization failed".to_string(),
            Self::Timeout { operation, .. } => format!("operation '{operation}' timed out"),
            Self::StaleConfiguration(_) => "session closed: configuration changed".to_string(),
            Self::ResourceExhausted(_) => "resource exhausted".to_string(),
            Self::Serialization(_) => "malformed message".to_string(),
            Self::Transport(_) => "transport error".to_string(),
        }
    }

    /// Transient errors (4, 6, 8) vs. permanent ones (2, 3, 5) — spec.md §7.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTransport(_)
                | Self::Timeout { .. }
                | Self::ResourceExhausted(_)
                | Self::Transport(_)
        )
    }

    /// Best-effort clone. Every variant but the two wrapping a foreign,
    /// non-`Clone` error type carries its fields forward unchanged; those
    /// two fall back to the variant that already shares their `code()`
    /// (`Serialization` -> `Protocol`, `Transport` -> `UpstreamTransport`),
    /// keeping their `Display` text. Needed wherever an error must outlive
    /// the single `Result` it arrived in — a pool warmup failure shared
    /// across every waiter on it, or a degraded member's last lease error
    /// remembered for the next request that hits it (spec.md §4.3: that
    /// error must propagate as-is, e.g. a 401 as `Unauthorized`, not a
    /// generic failure).
    pub fn clone_best_effort(&self) -> Self {
        match self {
            Self::Protocol(m) => Self::Protocol(m.clone()),
            Self::Routing(m) => Self::Routing(m.clone()),
            Self::Auth(m) => Self::Auth(m.clone()),
            Self::UpstreamTransport(m) => Self::UpstreamTransport(m.clone()),
            Self::UpstreamAuthorization(m) => Self::UpstreamAuthorization(m.clone()),
            Self::Timeout { operation, timeout_ms } => Self::Timeout {
                operation: operation.clone(),
                timeout_ms: *timeout_ms,
            },
            Self::StaleConfiguration(m) => Self::StaleConfiguration(m.clone()),
            Self::ResourceExhausted(m) => Self::ResourceExhausted(m.clone()),
            Self::Serialization(_) => Self::Protocol(self.to_string()),
            Self::Transport(_) => Self::UpstreamTransport(self.to_string()),
        }
    }

    /// Stable JSON-RPC error code for this kind (spec.md §7: "a stable
    /// `code` and a human `message`").
    pub fn code(&self) -> i32 {
        match self {
            Self::Protocol(_) => -32600,
            Self::Routing(_) => -32601, // MethodNotFound
            Self::Auth(_) => -32001,
            Self::UpstreamTransport(_) => -32002, // Unavailable
            Self::UpstreamAuthorization(_) => -32003, // Unauthorized
            Self::Timeout { .. } => -32004,
            Self::StaleConfiguration(_) => -32005,
            Self::ResourceExhausted(_) => -32006,
            Self::Serialization(_) => -32700, // ParseError
            Self::Transport(_) => -32002,
        }
    }
}

impl From<GatewayError> for JsonRpcError {
    fn from(err: GatewayError) -> Self {
        JsonRpcError {
            code: err.code(),
            message: err.sanitize(),
            data: None,
        }
    }
}

impl From<&GatewayError> for JsonRpcError {
    fn from(err: &GatewayError) -> Self {
        JsonRpcError {
            code: err.code(),
            message: err.sanitize(),
            data: None,
        }
    }
}
