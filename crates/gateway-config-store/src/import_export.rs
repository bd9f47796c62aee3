//! Bulk import/export (spec.md §6.2): the `{"mcpServers": {...}}` document
//! format used by existing MCP client configs, translated to and from
//! [`ServerConfig`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use gateway_core::model::{ServerConfig, TransportKind};

use crate::InMemoryConfigStore;

/// One entry of the `mcpServers` map. Tagged the same way
/// [`TransportKind`] is (`type`, snake_case), but flattens `description`
/// alongside the transport fields the way the on-disk format does — the
/// gateway's own [`ServerConfig`] keeps `description` one level up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum McpServerEntry {
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Sse {
        url: String,
        #[serde(rename = "bearerToken", default, skip_serializing_if = "Option::is_none")]
        bearer_token: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    StreamableHttp {
        url: String,
        #[serde(rename = "bearerToken", default, skip_serializing_if = "Option::is_none")]
        bearer_token: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl McpServerEntry {
    fn into_server_config(self, name: String) -> ServerConfig {
        let description = match &self {
            McpServerEntry::Stdio { description, .. }
            | McpServerEntry::Sse { description, .. }
            | McpServerEntry::StreamableHttp { description, .. } => description.clone(),
        };
        let transport = match self {
            McpServerEntry::Stdio { command, args, env, .. } => TransportKind::Stdio { command, args, env },
            McpServerEntry::Sse { url, bearer_token, .. } => TransportKind::Sse { url, bearer_token },
            McpServerEntry::StreamableHttp { url, bearer_token, .. } => {
                TransportKind::StreamableHttp { url, bearer_token }
            }
        };
        ServerConfig { id: name, transport, description }
    }

    fn from_server_config(config: &ServerConfig) -> Self {
        let description = config.description.clone();
        match &config.transport {
            TransportKind::Stdio { command, args, env } => McpServerEntry::Stdio {
                command: command.clone(),
                args: args.clone(),
                env: env.clone(),
                description,
            },
            TransportKind::Sse { url, bearer_token } => {
                McpServerEntry::Sse { url: url.clone(), bearer_token: bearer_token.clone(), description }
            }
            TransportKind::StreamableHttp { url, bearer_token } => {
                McpServerEntry::StreamableHttp { url: url.clone(), bearer_token: bearer_token.clone(), description }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct McpServersDocument {
    #[serde(rename = "mcpServers")]
    mcp_servers: BTreeMap<String, McpServerEntry>,
}

#[derive(Debug, Serialize)]
struct McpServersDocumentOut {
    #[serde(rename = "mcpServers")]
    mcp_servers: BTreeMap<String, McpServerEntry>,
}

/// One entry that failed to import, with the name it was keyed under so
/// the caller can correlate it back to the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEntryError {
    pub name: String,
    pub message: String,
}

/// Result of a bulk import: spec.md §6.2's "{imported count, per-entry
/// errors}".
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<ImportEntryError>,
}

/// Errors that abort the whole import before any entry is processed — a
/// document that isn't even valid JSON, or doesn't match the documented
/// shape at all.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed import document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Import `document` into `store`. Additive: each entry is tried
/// independently, a name collision fails only that entry (spec.md §6.2),
/// and processing continues through the rest of the document.
pub fn import(store: &InMemoryConfigStore, document: &str) -> Result<ImportReport, ImportError> {
    let parsed: McpServersDocument = serde_json::from_str(document)?;
    let mut report = ImportReport::default();

    for (name, entry) in parsed.mcp_servers {
        let config = entry.into_server_config(name.clone());
        if store.insert_server_config(config) {
            report.imported += 1;
        } else {
            report.errors.push(ImportEntryError { name, message: "a server config with this name already exists".to_string() });
        }
    }

    Ok(report)
}

/// Export every server config currently in `store` as the same document
/// shape [`import`] accepts, so an export/import round-trip is lossless
/// for the fields the format carries.
pub fn export(store: &InMemoryConfigStore) -> serde_json::Value {
    let mcp_servers: BTreeMap<String, McpServerEntry> = store
        .list_server_configs()
        .into_iter()
        .map(|config| (config.id.clone(), McpServerEntry::from_server_config(&config)))
        .collect();
    serde_json::to_value(McpServersDocumentOut { mcp_servers }).expect("server configs always serialize")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_additively_and_reports_collisions() {
        let store = InMemoryConfigStore::new();
        let doc = r#"{
            "mcpServers": {
                "fs": { "type": "stdio", "command": "mcp-fs", "args": ["--root", "/tmp"] },
                "remote": { "type": "sse", "url": "https://example.com/mcp", "bearerToken": "abc" }
            }
        }"#;
        let report = import(&store, doc).unwrap();
        assert_eq!(report.imported, 2);
        assert!(report.errors.is_empty());
        assert_eq!(store.list_server_configs().len(), 2);

        let second = import(&store, doc).unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.errors.len(), 2);
    }

    #[test]
    fn malformed_document_is_rejected_wholesale() {
        let store = InMemoryConfigStore::new();
        let err = import(&store, "not json").unwrap_err();
        assert!(matches!(err, ImportError::Malformed(_)));
    }

    #[test]
    fn export_round_trips_through_import() {
        let store = InMemoryConfigStore::new();
        let doc = r#"{"mcpServers": {"fs": {"type": "stdio", "command": "mcp-fs", "args": []}}}"#;
        import(&store, doc).unwrap();

        let exported = export(&store);
        let reimported_store = InMemoryConfigStore::new();
        let report = import(&reimported_store, &exported.to_string()).unwrap();
        assert_eq!(report.imported, 1);
    }
}
