//! Shared request/response plumbing used by every wire-shape handler:
//! credential extraction, dispatch-error-to-status mapping, and the
//! request/notification frame split (grounded on `turbomcp-transport`'s
//! `handlers::json_rpc` pattern of a flat `State`/`Extension` handler).

use std::convert::Infallible;
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::Event;
use axum::Json;
use futures::Stream;
use serde_json::Value;
use tokio::sync::broadcast;

use gateway_core::endpoint::{Credential, DispatchError};
use gateway_core::{ClientSession, GatewayError, OuterNotification};
use turbomcp_protocol::{JsonRpcNotification, JsonRpcRequest};

pub type ErrorBody = Json<Value>;

pub fn bearer_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub fn credential_from<'a>(headers: &'a HeaderMap, query_api_key: Option<&'a str>) -> Credential<'a> {
    Credential { bearer: bearer_from_headers(headers), query_api_key }
}

pub fn dispatch_error_response(err: DispatchError) -> (StatusCode, ErrorBody) {
    let (status, message) = match err {
        DispatchError::EndpointNotFound => (StatusCode::NOT_FOUND, "unknown endpoint"),
        DispatchError::MissingOrInvalidCredential => (StatusCode::UNAUTHORIZED, "missing or invalid credential"),
        DispatchError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
    };
    (status, Json(serde_json::json!({ "error": message })))
}

pub fn gateway_error_response(err: GatewayError) -> (StatusCode, ErrorBody) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": err.sanitize() })))
}

/// One inbound JSON-RPC frame: either a request (expects a response) or a
/// notification (fire-and-forget). Distinguished by the presence of an
/// `id` key, since [`JsonRpcRequest::id`] is mandatory rather than
/// nullable in this protocol crate.
pub enum Frame {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

pub fn decode_frame(body: &Value) -> Result<Frame, serde_json::Error> {
    if body.get("id").is_some() {
        Ok(Frame::Request(serde_json::from_value(body.clone())?))
    } else {
        Ok(Frame::Notification(serde_json::from_value(body.clone())?))
    }
}

/// Stream an Aggregator's outer notifications as SSE events, optionally
/// prefixed with one framing event (the SSE shape's `endpoint` event; the
/// Streamable-HTTP GET stream passes `None`). Shared between the two wire
/// shapes since both eventually reduce to "forward this broadcast as SSE".
pub fn notification_stream(
    session: Arc<ClientSession>,
    prelude: Option<Event>,
    mut notifications: broadcast::Receiver<OuterNotification>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        if let Some(event) = prelude {
            yield Ok(event);
        }

        loop {
            match notifications.recv().await {
                Ok(notification) => {
                    session.touch();
                    let data = serde_json::to_string(&notification.0).unwrap_or_default();
                    yield Ok(Event::default().event("message").data(data));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(session = %session.id, skipped, "client lagged behind aggregator notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
