//! Streamable-HTTP wire shape (spec.md §6.1, §4.5): a session-less `POST`
//! initializes and returns `mcp-session-id`; subsequent `POST`/`GET`
//! carry that header. `GET` opens a server-push stream the same way the
//! SSE shape's event stream does.

use std::convert::Infallible;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;

use gateway_core::endpoint::{self, Credential, WireShape};

use crate::handlers::common::{
    credential_from, decode_frame, dispatch_error_response, gateway_error_response, notification_stream, ErrorBody, Frame,
};
use crate::state::AppState;

static SESSION_HEADER: HeaderName = HeaderName::from_static("mcp-session-id");

fn session_id_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(&SESSION_HEADER).and_then(|v| v.to_str().ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiKeyQuery {
    api_key: Option<String>,
}

pub async fn post(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, (StatusCode, ErrorBody)> {
    post_core(state, endpoint, headers, Credential::default(), query.api_key.as_deref(), body).await
}

pub async fn post_legacy(
    State(state): State<AppState>,
    Path((key, endpoint)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, (StatusCode, ErrorBody)> {
    post_core(state, endpoint, headers, Credential { bearer: Some(&key), query_api_key: None }, None, body).await
}

async fn post_core(
    state: AppState,
    endpoint_name: String,
    headers: HeaderMap,
    legacy_credential: Credential<'_>,
    query_api_key: Option<&str>,
    body: Value,
) -> Result<impl IntoResponse, (StatusCode, ErrorBody)> {
    if let Some(session_id) = session_id_header(&headers) {
        let session = state
            .sessions
            .get(session_id)
            .ok_or_else(|| (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "unknown session" }))))?;
        session.touch();

        let frame = decode_frame(&body).map_err(|_| {
            (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "malformed frame" })))
        })?;
        let response = match frame {
            Frame::Request(req) => Some(session.handle(req).await),
            Frame::Notification(n) if n.method == "notifications/cancelled" => {
                if let Some(id) = n.params.as_ref().and_then(|p| p.get("requestId")).cloned() {
                    if let Ok(id) = serde_json::from_value(id) {
                        session.aggregator.cancel_outer_request(&id).await;
                    }
                }
                None
            }
            Frame::Notification(_) => None,
        };
        return Ok(match response {
            Some(response) => Json(serde_json::to_value(response).unwrap_or_default()).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        });
    }

    let credential = if legacy_credential.bearer.is_some() { legacy_credential } else { credential_from(&headers, query_api_key) };
    let dispatch = endpoint::resolve(state.config_store.as_ref(), &endpoint_name, WireShape::StreamableHttp, credential)
        .await
        .map_err(dispatch_error_response)?;

    let session = crate::commands::serve::open_session(&state, &endpoint_name, dispatch)
        .await
        .map_err(gateway_error_response)?;

    let frame = decode_frame(&body).map_err(|_| (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "malformed frame" }))))?;
    let Frame::Request(req) = frame else {
        return Err((StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "session-opening frame must be a request" }))));
    };
    let response = session.handle(req).await;

    let mut resp = Json(serde_json::to_value(response).unwrap_or_default()).into_response();
    if let Ok(value) = HeaderValue::from_str(&session.id) {
        resp.headers_mut().insert(SESSION_HEADER.clone(), value);
    }
    Ok(resp)
}

pub async fn get(
    State(state): State<AppState>,
    Path(_endpoint): Path<String>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    get_core(state, headers).await
}

pub async fn get_legacy(
    State(state): State<AppState>,
    Path((_key, _endpoint)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    get_core(state, headers).await
}

async fn get_core(
    state: AppState,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let session_id = session_id_header(&headers).ok_or(StatusCode::BAD_REQUEST)?;
    let session = state.sessions.get(session_id).ok_or(StatusCode::NOT_FOUND)?;
    let notifications = session.aggregator.subscribe_outer_notifications();
    Ok(Sse::new(notification_stream(session, None, notifications)).keep_alive(KeepAlive::default()))
}
