//! Single-consumer JSON-RPC message router for one downstream transport.
//!
//! Grounded on `turbomcp-client`'s `MessageDispatcher`: there must be
//! exactly one reader of `transport.receive()`, so a background task owns
//! it and routes every frame to the right place — responses to a waiting
//! `oneshot`, notifications onto a broadcast channel the Aggregator's
//! fan-in loop subscribes to. Unlike the client-side dispatcher this
//! router never needs to *answer* server-initiated requests (a downstream
//! MCP server is not expected to issue them), so there is no request
//! handler slot.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Notify, broadcast, oneshot};
use turbomcp_protocol::jsonrpc::JsonRpcMessage;
use turbomcp_protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, MessageId as RequestId};
use turbomcp_transport::{Transport, TransportMessage};

use crate::error::{GatewayError, GatewayResult};

const NOTIFICATION_CHANNEL_CAPACITY: usize = 1024;

/// Routes inbound frames from one downstream [`Transport`] to waiting
/// requesters, and fans notifications out to every subscriber.
pub struct DownstreamRouter {
    transport: Arc<dyn Transport>,
    response_waiters: Arc<std::sync::Mutex<HashMap<RequestId, oneshot::Sender<JsonRpcResponse>>>>,
    notifications: broadcast::Sender<JsonRpcNotification>,
    shutdown: Arc<Notify>,
}

impl std::fmt::Debug for DownstreamRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownstreamRouter").finish_non_exhaustive()
    }
}

impl DownstreamRouter {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        let router = Arc::new(Self {
            transport,
            response_waiters: Arc::new(std::sync::Mutex::new(HashMap::new())),
            notifications,
            shutdown: Arc::new(Notify::new()),
        });
        Self::spawn_routing_task(router.clone());
        router
    }

    /// Subscribe to downstream notifications (tools/listChanged, progress,
    /// stderr, ...). Every subscriber receives every notification; a slow
    /// subscriber drops the oldest entries rather than blocking the router.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<JsonRpcNotification> {
        self.notifications.subscribe()
    }

    /// Send a request and await its matched response.
    pub async fn request(&self, req: JsonRpcRequest) -> GatewayResult<JsonRpcResponse> {
        let (tx, rx) = oneshot::channel();
        self.response_waiters
            .lock()
            .expect("response_waiters mutex poisoned")
            .insert(req.id.clone(), tx);

        let payload = serde_json::to_vec(&JsonRpcMessage::Request(req.clone()))?;
        if let Err(e) = self
            .transport
            .send(TransportMessage::new(req.id.clone(), payload.into()))
            .await
        {
            self.response_waiters
                .lock()
                .expect("response_waiters mutex poisoned")
                .remove(&req.id);
            return Err(GatewayError::from(e));
        }

        rx.await
            .map_err(|_| GatewayError::upstream_transport("downstream connection closed before response arrived"))
    }

    /// Send a notification with no response expected (e.g.
    /// `notifications/cancelled`).
    pub async fn notify(&self, notification: JsonRpcNotification) -> GatewayResult<()> {
        let payload = serde_json::to_vec(&JsonRpcMessage::Notification(notification))?;
        self.transport
            .send(TransportMessage::new(
                RequestId::from(uuid::Uuid::new_v4().to_string()),
                payload.into(),
            ))
            .await
            .map_err(GatewayError::from)
    }

    /// Stop waiting for a response to `id` without sending anything
    /// downstream (used when the outer request is cancelled locally and
    /// an explicit `notifications/cancelled` has already been sent).
    pub fn abandon(&self, id: &RequestId) {
        self.response_waiters
            .lock()
            .expect("response_waiters mutex poisoned")
            .remove(id);
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    fn spawn_routing_task(router: Arc<Self>) {
        let transport = router.transport.clone();
        let response_waiters = router.response_waiters.clone();
        let notifications = router.notifications.clone();
        let shutdown = router.shutdown.clone();

        tokio::spawn(async move {
            tracing::debug!("downstream router task started");
            loop {
                tokio::select! {
                    _ = shutdown.notified() => {
                        tracing::debug!("downstream router task shutting down");
                        break;
                    }
                    result = transport.receive() => {
                        match result {
                            Ok(Some(msg)) => {
                                if let Err(e) = Self::route(msg, &response_waiters, &notifications) {
                                    tracing::warn!("failed to route downstream message: {e}");
                                }
                            }
                            Ok(None) if !transport.is_connected().await => {
                                tracing::warn!("downstream transport disconnected; failing in-flight requests");
                                Self::fail_all_waiters(&response_waiters);
                                break;
                            }
                            Ok(None) => {
                                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                            }
                            Err(e) => {
                                tracing::warn!("downstream transport receive error: {e}");
                                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                            }
                        }
                    }
                }
            }
        });
    }

    /// Drop every pending response waiter without sending, so each
    /// `request()` call in flight resolves its `rx.await` to an error
    /// (spec.md §7 point 4: "the lease is marked unhealthy; if the error
    /// occurred mid-request, the outer request receives ... `Unavailable`").
    fn fail_all_waiters(
        response_waiters: &std::sync::Mutex<HashMap<RequestId, oneshot::Sender<JsonRpcResponse>>>,
    ) {
        response_waiters.lock().expect("response_waiters mutex poisoned").clear();
    }

    fn route(
        msg: TransportMessage,
        response_waiters: &std::sync::Mutex<HashMap<RequestId, oneshot::Sender<JsonRpcResponse>>>,
        notifications: &broadcast::Sender<JsonRpcNotification>,
    ) -> GatewayResult<()> {
        let parsed: JsonRpcMessage = serde_json::from_slice(&msg.payload)?;
        match parsed {
            JsonRpcMessage::Response(resp) => {
                if let Some(id) = resp.id.as_request_id() {
                    if let Some(tx) = response_waiters
                        .lock()
                        .expect("response_waiters mutex poisoned")
                        .remove(id)
                    {
                        let _ = tx.send(resp);
                    } else {
                        tracing::debug!("response for unknown/expired downstream request id");
                    }
                }
            }
            JsonRpcMessage::Notification(notification) => {
                let _ = notifications.send(notification);
            }
            JsonRpcMessage::Request(request) => {
                // Downstream MCP servers are not expected to issue
                // server-initiated requests in this gateway's scope
                // (sampling/elicitation passthrough is out of scope —
                // spec.md §1 Non-goals).
                tracing::debug!(method = %request.method, "ignoring unexpected downstream-initiated request");
            }
        }
        Ok(())
    }
}
