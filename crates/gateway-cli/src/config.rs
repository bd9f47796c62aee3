//! Gateway configuration (spec.md §6.3, §13): a `clap::Parser` struct for
//! flags/env vars layered over an optional startup snapshot file that
//! seeds the config store with server configs, namespaces, and endpoints.
//! Mirrors the teacher's `cli::args` module structure, sized down to one
//! daemon's worth of flags instead of a multi-command CLI's shared types.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use gateway_core::aggregator::RequestTimeouts;
use gateway_core::model::{Endpoint, Namespace};

use crate::error::{CliError, CliResult};

/// `gatewayd` — an MCP aggregating gateway.
#[derive(Debug, Parser)]
#[command(name = "gatewayd", version, about = "MCP aggregating gateway")]
pub struct GatewayConfig {
    /// Address to listen on.
    #[arg(long, env = "GATEWAY_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Public base URL used to construct the SSE message path returned to
    /// clients (spec.md §6.3).
    #[arg(long, env = "GATEWAY_PUBLIC_BASE_URL", default_value = "http://127.0.0.1:3000")]
    pub public_base_url: String,

    /// Path prefix under which every endpoint is mounted (spec.md §6.1's
    /// `{prefix}`). Empty by default.
    #[arg(long, env = "GATEWAY_PATH_PREFIX", default_value = "")]
    pub path_prefix: String,

    /// Startup snapshot: server configs, namespaces, and endpoints loaded
    /// into the in-memory config store before the listener opens.
    #[arg(long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Idle-pool target size per fingerprint (spec.md §4.2, §6.3 default 1).
    #[arg(long, env = "GATEWAY_IDLE_POOL_TARGET", default_value_t = 1)]
    pub idle_pool_target: usize,

    /// Downstream timeout, in seconds, for `list`-family requests.
    #[arg(long, env = "GATEWAY_LIST_TIMEOUT_SECS", default_value_t = 30)]
    pub list_timeout_secs: u64,

    /// Downstream timeout, in seconds, for `call`-family requests.
    #[arg(long, env = "GATEWAY_CALL_TIMEOUT_SECS", default_value_t = 120)]
    pub call_timeout_secs: u64,

    /// Idle timeout, in seconds, before a Client Session with no outer
    /// traffic is closed. Unset (the default) disables idle timeout
    /// entirely, per spec.md §4.5.
    #[arg(long, env = "GATEWAY_SESSION_IDLE_TIMEOUT_SECS")]
    pub session_idle_timeout_secs: Option<u64>,

    /// Accept the deprecated legacy `{prefix}/api-key/<key>/...` paths
    /// (spec.md §6.1). Supported by default for compatibility with
    /// existing clients; disable once they've migrated.
    #[arg(long, env = "GATEWAY_DISABLE_LEGACY_API_KEY_PATHS")]
    pub disable_legacy_api_key_paths: bool,

    /// Enable verbose logging (-v, -vv, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl GatewayConfig {
    pub fn request_timeouts(&self) -> RequestTimeouts {
        RequestTimeouts {
            list: Duration::from_secs(self.list_timeout_secs),
            call: Duration::from_secs(self.call_timeout_secs),
        }
    }

    pub fn session_idle_timeout(&self) -> Option<Duration> {
        self.session_idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn init_tracing(&self) {
        let level = match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }
}

/// The `{"mcpServers": {...}, "namespaces": [...], "endpoints": [...]}`
/// startup snapshot referenced by `--config`. `mcp_servers` is kept as raw
/// JSON rather than parsed here so it can be handed straight to
/// `gateway_config_store::import_export::import`, which already owns that
/// document's shape.
#[derive(Debug, Default, Deserialize)]
pub struct StartupSnapshot {
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub namespaces: Vec<Namespace>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl StartupSnapshot {
    /// Re-serialize the `mcpServers` portion alone, in the shape
    /// `import_export::import` expects.
    pub fn mcp_servers_document(&self) -> String {
        serde_json::json!({ "mcpServers": self.mcp_servers }).to_string()
    }
}

pub fn load_snapshot(path: &PathBuf) -> CliResult<StartupSnapshot> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| CliError::ConfigFile { path: path.display().to_string(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| CliError::ConfigParse { path: path.display().to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_parses_with_defaults() {
        let snapshot: StartupSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.mcp_servers.is_empty());
        assert!(snapshot.namespaces.is_empty());
        assert!(snapshot.endpoints.is_empty());
    }

    #[test]
    fn mcp_servers_document_round_trips_through_serde_json() {
        let snapshot: StartupSnapshot = serde_json::from_str(
            r#"{"mcpServers": {"fs": {"type": "stdio", "command": "mcp-fs"}}}"#,
        )
        .unwrap();
        let doc = snapshot.mcp_servers_document();
        assert!(doc.contains("\"fs\""));
        assert!(doc.contains("mcp-fs"));
    }
}
