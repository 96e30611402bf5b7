//! Real-time subscriber connections.
//!
//! Lifetime of one connection: register, upgrade, forward queued payloads
//! until a disconnect or cancellation is observed, deregister.
//! No backlog is sent on connect.

use crate::error::ApiError;
use crate::registry::Subscription;
use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};

/// `GET /api/v1/ws`
///
/// The slot is reserved before the upgrade so the cap holds under concurrent
/// connects. A failed upgrade releases it.
pub async fn subscribe(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let registry = state.registry();
    let max = state.config().max_subscribers;
    let Some(subscription) = registry.try_register(max) else {
        warn!(max, "Subscriber limit reached");
        return ApiError::Unavailable("Too many subscribers".to_string()).into_response();
    };

    let id = subscription.id;
    let failed = registry.clone();
    ws.on_failed_upgrade(move |e| {
        debug!(subscriber = id, error = %e, "WebSocket upgrade failed");
        failed.deregister(id);
    })
    .on_upgrade(move |socket| serve_subscriber(socket, state, subscription))
}

/// Why a subscriber connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    /// Registry dropped us (queue full/closed) or the server is shutting down.
    Cancelled,
    /// Client closed or the socket errored.
    Disconnected,
    SendFailed,
}

async fn serve_subscriber(socket: WebSocket, state: AppState, subscription: Subscription) {
    let registry = state.registry();
    let id = subscription.id;

    let reason = forward(socket, subscription, state.config().send_timeout()).await;

    registry.deregister(id);
    debug!(subscriber = id, ?reason, "Subscriber connection ended");
}

async fn forward(socket: WebSocket, subscription: Subscription, send_timeout: Duration) -> EndReason {
    let Subscription {
        id,
        mut rx,
        closed,
    } = subscription;
    let (mut sender, mut receiver) = socket.split();

    // Inbound side only watches for close; clients have nothing to say.
    let mut incoming = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                _ => {}
            }
        }
    });

    let reason = loop {
        tokio::select! {
            _ = closed.cancelled() => break EndReason::Cancelled,
            _ = &mut incoming => break EndReason::Disconnected,
            payload = rx.recv() => {
                let Some(payload) = payload else {
                    break EndReason::Cancelled;
                };
                let send = sender.send(Message::Text(payload.as_ref().to_owned().into()));
                match tokio::time::timeout(send_timeout, send).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        debug!(subscriber = id, error = %e, "Send failed");
                        break EndReason::SendFailed;
                    }
                    Err(_) => {
                        warn!(subscriber = id, timeout_ms = send_timeout.as_millis() as u64, "Send timed out");
                        break EndReason::SendFailed;
                    }
                }
            }
        }
    };

    incoming.abort();
    let _ = tokio::time::timeout(send_timeout, async {
        if reason != EndReason::Disconnected {
            let _ = sender.send(Message::Close(None)).await;
        }
        let _ = sender.close().await;
    })
    .await;
    reason
}
