//! WebSocket upgrade handler.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use famcast_core::types::identity::VerifiedIdentity;
use famcast_relay::connection::heartbeat;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Opaque bearer credential.
    pub token: Option<String>,
}

/// GET /ws?token={credential} — WebSocket upgrade.
///
/// Authentication happens before the upgrade: a missing or invalid
/// credential is refused with no directory or channel side effects.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let identity = state.engine.gate.verify(query.token.as_deref()).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, identity, socket)))
}

/// Drives an established WebSocket connection.
async fn handle_socket(state: AppState, identity: VerifiedIdentity, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.engine.connections.register(identity);
    let conn_id = handle.id;

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Forward relay messages out and keep the transport alive with
    // protocol-level pings.
    let ping_interval = Duration::from_secs(state.engine.config.ping_interval_seconds);
    let outbound_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_interval);
        loop {
            tokio::select! {
                outbound = outbound_rx.recv() => {
                    let Some(msg) = outbound else { break };
                    let text = match serde_json::to_string(&msg) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(conn_id = %conn_id, error = %e, "Failed to serialize outbound message");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Watchdog marks the connection dead when pongs stop.
    let mut watchdog = tokio::spawn(heartbeat::run_watchdog(
        handle.clone(),
        state.engine.config.clone(),
    ));

    loop {
        tokio::select! {
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        state
                            .engine
                            .connections
                            .handle_inbound(&handle, text.as_str())
                            .await;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        handle.record_pong();
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            _ = &mut watchdog => break,
        }
    }

    outbound_task.abort();
    watchdog.abort();
    state.engine.connections.unregister(&handle);

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
