//! Middleware Chain (C4, spec.md §4.4).
//!
//! Two hooks, run in declared order, per namespace: `transform_catalog`
//! (pure, post-aggregation) and `intercept_call` (forward or short-circuit
//! before a request reaches a downstream). The chain may be empty.

use serde_json::Value;

use crate::error::GatewayResult;
use crate::model::MiddlewareSpec;

/// What kind of catalog a `transform_catalog` call is filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Tools,
    Prompts,
    Resources,
    ResourceTemplates,
}

/// The outcome of `intercept_call`: either let the request continue to its
/// mapped downstream, or answer it immediately without contacting one.
pub enum InterceptOutcome {
    Forward,
    ShortCircuit(GatewayResult<Value>),
}

/// One entry, exposed name, and its per-member enabled flag, as seen by
/// the middleware chain. The chain only ever filters; it never invents or
/// renames entries (that is the Aggregator's job in C3).
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub exposed_name: String,
    pub enabled: bool,
    pub item: Value,
}

/// A single middleware in the chain.
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    /// Filter/transform an already-aggregated, already-disambiguated
    /// catalog. Pure: must not perform I/O or hold state across calls.
    fn transform_catalog(&self, kind: CatalogKind, items: Vec<CatalogEntry>) -> Vec<CatalogEntry>;

    /// Decide whether a call-family request (`tools/call` and siblings)
    /// reaches its mapped downstream, or is answered here instead.
    fn intercept_call(&self, exposed_name: &str, enabled: bool) -> InterceptOutcome;
}

/// Drops catalog entries whose per-member-tool enabled flag is false, and
/// rejects calls against them with `tool not found` (spec.md §4.4's one
/// built-in middleware).
#[derive(Debug, Default)]
pub struct FilterInactiveTools;

impl Middleware for FilterInactiveTools {
    fn name(&self) -> &'static str {
        "filter-inactive-tools"
    }

    fn transform_catalog(&self, _kind: CatalogKind, items: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
        items.into_iter().filter(|e| e.enabled).collect()
    }

    fn intercept_call(&self, exposed_name: &str, enabled: bool) -> InterceptOutcome {
        if enabled {
            InterceptOutcome::Forward
        } else {
            InterceptOutcome::ShortCircuit(Err(crate::error::GatewayError::tool_not_found(exposed_name)))
        }
    }
}

/// Build the concrete middleware chain for a namespace from its declared
/// [`MiddlewareSpec`] list, preserving declaration order.
pub fn build_chain(specs: &[MiddlewareSpec]) -> Vec<Box<dyn Middleware>> {
    specs
        .iter()
        .map(|spec| -> Box<dyn Middleware> {
            match spec {
                MiddlewareSpec::FilterInactiveTools => Box::new(FilterInactiveTools),
            }
        })
        .collect()
}

/// Run `transform_catalog` through every middleware in the chain, in order.
pub fn run_transform_catalog(
    chain: &[Box<dyn Middleware>],
    kind: CatalogKind,
    mut items: Vec<CatalogEntry>,
) -> Vec<CatalogEntry> {
    for mw in chain {
        items = mw.transform_catalog(kind, items);
    }
    items
}

/// Run `intercept_call` through the chain in order; the first
/// short-circuit wins.
pub fn run_intercept_call(
    chain: &[Box<dyn Middleware>],
    exposed_name: &str,
    enabled: bool,
) -> InterceptOutcome {
    for mw in chain {
        if let InterceptOutcome::ShortCircuit(result) = mw.intercept_call(exposed_name, enabled) {
            return InterceptOutcome::ShortCircuit(result);
        }
    }
    InterceptOutcome::Forward
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, enabled: bool) -> CatalogEntry {
        CatalogEntry {
            exposed_name: name.to_string(),
            enabled,
            item: serde_json::json!({ "name": name }),
        }
    }

    #[test]
    fn filter_inactive_tools_drops_disabled_entries() {
        let chain = build_chain(&[MiddlewareSpec::FilterInactiveTools]);
        let items = vec![entry("a", true), entry("b", false), entry("c", true)];
        let filtered = run_transform_catalog(&chain, CatalogKind::Tools, items);
        let names: Vec<_> = filtered.iter().map(|e| e.exposed_name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn filter_inactive_tools_rejects_calls_on_disabled_entries() {
        let chain = build_chain(&[MiddlewareSpec::FilterInactiveTools]);
        match run_intercept_call(&chain, "b", false) {
            InterceptOutcome::ShortCircuit(Err(e)) => assert_eq!(e.code(), -32601),
            _ => panic!("expected a short-circuited tool-not-found error"),
        }
    }

    #[test]
    fn empty_chain_forwards_everything() {
        let chain = build_chain(&[]);
        let items = vec![entry("a", false)];
        assert_eq!(run_transform_catalog(&chain, CatalogKind::Tools, items.clone()).len(), 1);
        matches!(run_intercept_call(&chain, "a", false), InterceptOutcome::Forward);
    }
}
