//! Axum handlers for the three wire shapes spec.md §6.1 names: SSE,
//! Streamable-HTTP, and the read-only OpenAPI view. `common` holds the
//! plumbing shared across all of them.

pub mod common;
pub mod openapi;
pub mod sse;
pub mod streamable_http;
