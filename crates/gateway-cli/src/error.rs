//! CLI-level error type (spec.md §12's "gateway-cli defines its own
//! narrow `thiserror` enum following the same per-crate convention").

use thiserror::Error;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigFile { path: String, #[source] source: std::io::Error },

    #[error("malformed config file {path}: {source}")]
    ConfigParse { path: String, #[source] source: serde_json::Error },

    #[error("failed to bind listener on {addr}: {source}")]
    Bind { addr: String, #[source] source: std::io::Error },

    #[error("server error: {0}")]
    Server(String),

    #[error(transparent)]
    Gateway(#[from] gateway_core::GatewayError),
}

impl CliError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Print `error` to stderr and return the process exit code, mirroring
/// `turbomcp-proxy`'s `cli::error::display_error`.
pub fn display_error(error: &CliError) -> i32 {
    eprintln!("error: {error}");
    1
}
