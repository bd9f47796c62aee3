//! gatewayd CLI entry point. Commands return the crate's own `CliError`;
//! `anyhow` is reserved for this boundary alone, the way `turbomcp-cli`'s
//! command functions use it.

use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = gateway_cli::config::GatewayConfig::parse();

    gateway_cli::commands::serve::run(config)
        .await
        .context("gatewayd exited with an error")?;
    Ok(())
}
