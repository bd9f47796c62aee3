//! SSE wire shape (spec.md §6.1, §4.5): `GET /<endpoint>/sse` opens the
//! stream and mints a session id; `POST /<endpoint>/message?sessionId=…`
//! carries client-originated frames. Grounded on
//! `turbomcp-transport::axum::handlers::sse`'s broadcast-to-`Sse` pattern.

use std::convert::Infallible;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;

use gateway_core::endpoint::{self, Credential, WireShape};

use crate::handlers::common::{
    credential_from, decode_frame, dispatch_error_response, gateway_error_response, notification_stream, ErrorBody, Frame,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionIdQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

pub async fn connect(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, ErrorBody)> {
    connect_with_credential(state, endpoint, credential_from(&headers, None)).await
}

pub async fn connect_legacy(
    State(state): State<AppState>,
    Path((key, endpoint)): Path<(String, String)>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, ErrorBody)> {
    connect_with_credential(state, endpoint, Credential { bearer: Some(&key), query_api_key: None }).await
}

async fn connect_with_credential(
    state: AppState,
    endpoint_name: String,
    credential: Credential<'_>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, ErrorBody)> {
    let dispatch = endpoint::resolve(state.config_store.as_ref(), &endpoint_name, WireShape::Sse, credential)
        .await
        .map_err(dispatch_error_response)?;

    let session = crate::commands::serve::open_session(&state, &endpoint_name, dispatch).await.map_err(gateway_error_response)?;

    let message_url = format!(
        "{}{}/{}/message?sessionId={}",
        state.config.public_base_url, state.config.path_prefix, endpoint_name, session.id
    );
    let notifications = session.aggregator.subscribe_outer_notifications();
    let prelude = Event::default().event("endpoint").data(message_url);

    Ok(Sse::new(notification_stream(session, Some(prelude), notifications)).keep_alive(KeepAlive::default()))
}

pub async fn message(
    State(state): State<AppState>,
    Path(_endpoint): Path<String>,
    Query(query): Query<SessionIdQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    message_core(&state, &query.session_id, body).await
}

pub async fn message_legacy(
    State(state): State<AppState>,
    Path((_key, _endpoint)): Path<(String, String)>,
    Query(query): Query<SessionIdQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    message_core(&state, &query.session_id, body).await
}

async fn message_core(state: &AppState, session_id: &str, body: Value) -> Result<Json<Value>, StatusCode> {
    let session = state.sessions.get(session_id).ok_or(StatusCode::NOT_FOUND)?;
    session.touch();

    let frame = decode_frame(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    match frame {
        Frame::Request(req) => {
            let response = session.handle(req).await;
            Ok(Json(serde_json::to_value(response).unwrap_or_default()))
        }
        Frame::Notification(notification) if notification.method == "notifications/cancelled" => {
            if let Some(id) = notification.params.as_ref().and_then(|p| p.get("requestId")).cloned() {
                if let Ok(id) = serde_json::from_value(id) {
                    session.aggregator.cancel_outer_request(&id).await;
                }
            }
            Ok(Json(serde_json::json!({})))
        }
        Frame::Notification(_) => Ok(Json(serde_json::json!({}))),
    }
}
