//! Shared Axum application state, mirroring `turbomcp-transport`'s
//! `McpAppState`: one `Clone`-able struct of `Arc`s handed to every
//! handler through `State`.

use std::sync::Arc;

use gateway_config_store::InMemoryConfigStore;
use gateway_core::{ClientSessionManager, InvalidationBus, SessionPool};

use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    pub config_store: Arc<InMemoryConfigStore>,
    pub pool: Arc<SessionPool>,
    pub sessions: Arc<ClientSessionManager>,
    pub invalidation: Arc<InvalidationBus>,
    pub config: Arc<GatewayConfig>,
}
