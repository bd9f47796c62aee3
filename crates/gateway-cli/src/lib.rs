//! `gatewayd`: the MCP aggregating gateway daemon. Wires `gateway-core`'s
//! framework-agnostic C1–C7 and `gateway-config-store`'s C8 behind Axum,
//! following the layout `turbomcp-proxy` uses for its own CLI binary — a
//! thin `main.rs` over a library crate of `config`/`error`/`state` plus a
//! `commands` module per subcommand.

pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
