//! Read-only OpenAPI view (spec.md §6.1, §9 open question 2 resolved as
//! "tools only"): `GET {prefix}/<endpoint>/api` lists the aggregated tool
//! catalog as JSON, `GET {prefix}/<endpoint>/api/openapi.json` derives an
//! OpenAPI 3.0 document from it. Neither route registers a Client
//! Session — the Aggregator built here is thrown away once the catalog is
//! read, since there is no outer wire to keep it alive for.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use gateway_core::endpoint::{self, Credential, WireShape};
use turbomcp_protocol::{JsonRpcRequest, JsonRpcVersion, MessageId};

use crate::handlers::common::{credential_from, dispatch_error_response, gateway_error_response, ErrorBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApiKeyQuery {
    api_key: Option<String>,
}

async fn tool_catalog(state: &AppState, endpoint_name: &str, credential: Credential<'_>) -> Result<Value, (StatusCode, ErrorBody)> {
    let dispatch = endpoint::resolve(state.config_store.as_ref(), endpoint_name, WireShape::OpenApi, credential)
        .await
        .map_err(dispatch_error_response)?;

    let session = crate::commands::serve::open_session(state, endpoint_name, dispatch).await.map_err(gateway_error_response)?;

    let request = JsonRpcRequest {
        jsonrpc: JsonRpcVersion,
        method: "tools/list".to_string(),
        params: None,
        id: MessageId::Number(0),
    };
    let response = session.handle(request).await;
    state.sessions.close(&session.id, gateway_core::CloseReason::ClientClosed).await;

    let body = serde_json::to_value(response).unwrap_or_default();
    Ok(body.get("result").cloned().unwrap_or(serde_json::json!({ "tools": [] })))
}

pub async fn catalog(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ApiKeyQuery>,
) -> Result<Json<Value>, (StatusCode, ErrorBody)> {
    let credential = credential_from(&headers, query.api_key.as_deref());
    tool_catalog(&state, &endpoint, credential).await.map(Json)
}

pub async fn schema(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ApiKeyQuery>,
) -> Result<Json<Value>, (StatusCode, ErrorBody)> {
    let credential = credential_from(&headers, query.api_key.as_deref());
    let catalog = tool_catalog(&state, &endpoint, credential).await?;

    let tools = catalog.get("tools").and_then(|t| t.as_array()).cloned().unwrap_or_default();
    let mut paths = serde_json::Map::new();
    for tool in &tools {
        let Some(name) = tool.get("name").and_then(|n| n.as_str()) else { continue };
        let schema = tool.get("inputSchema").cloned().unwrap_or(serde_json::json!({}));
        paths.insert(
            format!("/{name}"),
            serde_json::json!({
                "post": {
                    "summary": tool.get("description").and_then(|d| d.as_str()).unwrap_or(name),
                    "requestBody": { "content": { "application/json": { "schema": schema } } },
                    "responses": { "200": { "description": "tool result" } },
                }
            }),
        );
    }

    Ok(Json(serde_json::json!({
        "openapi": "3.0.3",
        "info": { "title": format!("{endpoint} tools"), "version": "1.0.0" },
        "paths": paths,
    })))
}
