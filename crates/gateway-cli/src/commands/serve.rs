//! `gatewayd`'s one command: build the config store (optionally seeded
//! from a startup snapshot), wire C7 through C1, and serve the three wire
//! shapes behind Axum. Grounded on `turbomcp-proxy`'s
//! `cli::commands::serve::ServeCommand::execute`, generalized from one
//! fixed backend/frontend pair to dynamic per-endpoint dispatch.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;

use gateway_config_store::InMemoryConfigStore;
use gateway_core::endpoint::Dispatch;
use gateway_core::{Aggregator, ClientSession, ClientSessionManager, ConfigStore, GatewayError, GatewayResult, InvalidationBus, SessionPool};
use turbomcp_protocol::ServerInfo;

use crate::config::GatewayConfig;
use crate::error::{CliError, CliResult};
use crate::handlers;
use crate::state::AppState;

const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(30);
const STALE_SWEEP_INTERVAL: Duration = gateway_core::STALE_LEASE_POLL_INTERVAL;

/// Resolve a dispatch into a live Client Session: load the dispatched
/// endpoint's namespace, track each member's current fingerprint for the
/// Invalidation Bus (C7 needs the *prior* fingerprint once a ServerConfig
/// is edited or deleted, which it can no longer read back from C8), build
/// an Aggregator, and register the session with C5.
pub async fn open_session(state: &AppState, endpoint_name: &str, dispatch: Dispatch) -> GatewayResult<Arc<ClientSession>> {
    let namespace = state
        .config_store
        .get_namespace(&dispatch.endpoint.namespace)
        .await
        .map_err(|e| GatewayError::routing(e.to_string()))?
        .ok_or_else(|| GatewayError::routing(format!("namespace '{}' not found", dispatch.endpoint.namespace)))?;

    for member in &namespace.members {
        state.invalidation.track_fingerprint(member.server.id.clone(), member.server.fingerprint());
    }

    let server_info = ServerInfo { name: "gatewayd".to_string(), version: env!("CARGO_PKG_VERSION").to_string() };
    let aggregator = Aggregator::new(&namespace, state.pool.clone(), server_info, state.config.request_timeouts()).await?;

    Ok(state.sessions.create(endpoint_name.to_string(), namespace.id.clone(), dispatch.principal, aggregator))
}

/// Build the full wire-shape router over an already-assembled [`AppState`].
/// Split out from [`run`] so integration tests can drive it directly with
/// `tower::ServiceExt::oneshot` against a hand-built state, without binding
/// a real listener.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/:endpoint/sse", get(handlers::sse::connect))
        .route("/:endpoint/message", post(handlers::sse::message))
        .route(
            "/:endpoint/mcp",
            post(handlers::streamable_http::post).get(handlers::streamable_http::get),
        )
        .route("/:endpoint/api", get(handlers::openapi::catalog))
        .route("/:endpoint/api/openapi.json", get(handlers::openapi::schema));

    if !state.config.disable_legacy_api_key_paths {
        router = router
            .route("/api-key/:key/:endpoint/sse", get(handlers::sse::connect_legacy))
            .route("/api-key/:key/:endpoint/message", post(handlers::sse::message_legacy))
            .route(
                "/api-key/:key/:endpoint/mcp",
                post(handlers::streamable_http::post_legacy).get(handlers::streamable_http::get_legacy),
            );
    }

    router.with_state(state)
}

async fn load_startup_snapshot(config: &GatewayConfig, config_store: &InMemoryConfigStore) -> CliResult<()> {
    let Some(path) = &config.config else { return Ok(()) };
    let snapshot = crate::config::load_snapshot(path)?;

    let report = gateway_config_store::import_export::import(config_store, &snapshot.mcp_servers_document())
        .map_err(|e| CliError::configuration(e.to_string()))?;
    for error in &report.errors {
        tracing::warn!(server = %error.name, reason = %error.message, "skipped server config from startup snapshot");
    }
    tracing::info!(imported = report.imported, "loaded server configs from startup snapshot");

    for namespace in snapshot.namespaces {
        config_store.put_namespace(namespace);
    }
    for endpoint in snapshot.endpoints {
        config_store.put_endpoint(endpoint);
    }
    Ok(())
}

pub async fn run(config: GatewayConfig) -> CliResult<()> {
    config.init_tracing();

    let config_store = Arc::new(InMemoryConfigStore::new());
    load_startup_snapshot(&config, &config_store).await?;

    let pool = Arc::new(SessionPool::with_target_idle(config.idle_pool_target));
    let config_store_dyn: Arc<dyn ConfigStore> = config_store.clone();
    let invalidation = InvalidationBus::new(pool.clone(), config_store_dyn);
    invalidation.spawn();

    let sessions = ClientSessionManager::new(config.session_idle_timeout());
    sessions.spawn_invalidation_listener(invalidation.subscribe());
    spawn_idle_sweep(sessions.clone());
    spawn_stale_sweep(sessions.clone());

    let state = AppState { config_store, pool, sessions, invalidation, config: Arc::new(config) };
    let bind = state.config.bind;
    let prefix = state.config.path_prefix.clone();

    let router = build_router(state);
    let router = if prefix.is_empty() { router } else { Router::new().nest(&prefix, router) };

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|source| CliError::Bind { addr: bind.to_string(), source })?;

    tracing::info!(%bind, "gatewayd listening");
    axum::serve(listener, router).await.map_err(|e| CliError::Server(e.to_string()))?;
    Ok(())
}

fn spawn_idle_sweep(sessions: Arc<ClientSessionManager>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(IDLE_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.sweep_idle().await;
        }
    });
}

/// Poll-based backstop for the stale-lease signal (spec.md §4.3), run
/// alongside the Invalidation Bus's push-based close so a session closes
/// even if its bus signal arrived mid-request.
fn spawn_stale_sweep(sessions: Arc<ClientSessionManager>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STALE_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.sweep_stale().await;
        }
    });
}
