//! Data model entities shared across the gateway core (spec §3).
//!
//! These types carry no behavior of their own; the components in sibling
//! modules own the transitions between the states described here.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Opaque identifier for a [`ServerConfig`].
pub type ServerConfigId = String;

/// Opaque identifier for a [`Namespace`].
pub type NamespaceId = String;

/// A deterministic hash of a server config's behavior-affecting fields.
///
/// Two [`ServerConfig`]s are fingerprint-equal iff every field that affects
/// process/connection behavior is equal; the environment map is compared by
/// key/value, not by insertion order. This is the Session Pool's lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(pub u64);

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Transport-specific launch/connection parameters for a downstream server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportKind {
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
    },
    Sse {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        bearer_token: Option<String>,
    },
    StreamableHttp {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        bearer_token: Option<String>,
    },
}

/// Immutable descriptor of how to launch one downstream MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub id: ServerConfigId,
    pub transport: TransportKind,
    #[serde(default)]
    pub description: Option<String>,
}

impl ServerConfig {
    /// Compute this config's pool fingerprint.
    ///
    /// Environment maps are hashed key-sorted so insertion order never
    /// affects the fingerprint, matching spec.md §3's "compared by
    /// key/value" requirement.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        match &self.transport {
            TransportKind::Stdio { command, args, env } => {
                0u8.hash(&mut hasher);
                command.hash(&mut hasher);
                args.hash(&mut hasher);
                let mut pairs: Vec<(&String, &String)> = env.iter().collect();
                pairs.sort_by(|a, b| a.0.cmp(b.0));
                for (k, v) in pairs {
                    k.hash(&mut hasher);
                    v.hash(&mut hasher);
                }
            }
            TransportKind::Sse { url, bearer_token } => {
                1u8.hash(&mut hasher);
                url.hash(&mut hasher);
                bearer_token.hash(&mut hasher);
            }
            TransportKind::StreamableHttp { url, bearer_token } => {
                2u8.hash(&mut hasher);
                url.hash(&mut hasher);
                bearer_token.hash(&mut hasher);
            }
        }
        Fingerprint(hasher.finish())
    }

    /// Short, human-readable id used to disambiguate colliding tool names
    /// (spec.md §4.3: `<shortId>__<name>`).
    pub fn short_id(&self) -> &str {
        // The configured id is already operator-chosen and URL-safe; it
        // doubles as the short id. A future revision may shorten further
        // if ids grow unwieldy.
        &self.id
    }
}

/// One member of a [`Namespace`]: a server config plus its per-namespace
/// enable flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceMember {
    pub server: ServerConfig,
    /// Whether this member is aggregated at all.
    pub enabled: bool,
    /// Tools disabled for this specific member, by inner tool name.
    #[serde(default)]
    pub disabled_tools: std::collections::HashSet<String>,
}

/// Identifies a built-in middleware by name; spec.md §4.4 names exactly one
/// (`filter-inactive-tools`), but the chain is declared as a list of specs
/// so additional middleware can be appended without changing the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiddlewareSpec {
    FilterInactiveTools,
}

/// Ordered set of downstream server configs plus the middleware chain
/// applied to their aggregated catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub id: NamespaceId,
    pub members: Vec<NamespaceMember>,
    #[serde(default)]
    pub middleware: Vec<MiddlewareSpec>,
}

impl Namespace {
    pub fn enabled_members(&self) -> impl Iterator<Item = &NamespaceMember> {
        self.members.iter().filter(|m| m.enabled)
    }
}

/// Authentication policy for an [`Endpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthPolicy {
    /// No credential required.
    Public,
    /// `Authorization: Bearer <k>` required.
    RequireBearer,
    /// Bearer header accepted, and (per wire-shape rules in §6.1/§4.6) an
    /// `api_key` query parameter is also accepted.
    AllowQueryParamBearer,
}

/// {name, namespace reference, auth policy}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub namespace: NamespaceId,
    pub auth: AuthPolicy,
}

/// A principal resolved from a validated credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    /// `None` for a key minted without an owning user (a "public" key in
    /// the sense of spec.md §4.6/§9 Open Question 4).
    pub owner: Option<String>,
    pub is_public_key: bool,
}

/// Selector for an [`crate::invalidation::InvalidationEvent`] / config-store
/// change event (spec.md §3, §4.7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSelector {
    Fingerprint(Fingerprint),
    Namespace(NamespaceId),
    Endpoint(String),
    Principal(String),
    All,
}
