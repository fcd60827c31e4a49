// WebSocket stream of session views and alerts

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::presentation::AppView;
use crate::session::SessionEvent;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the client count on drop (connect = +1, drop = -1).
struct WsClientGuard(Arc<AtomicUsize>);

impl Drop for WsClientGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

pub(super) async fn ws_state(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let mut rx = state.session.subscribe();
        if let Err(e) = stream_state(socket, &mut rx, state).await {
            tracing::info!("State stream error: {}", e);
        }
    })
}

/// Send `json`; false means the client is gone or too slow.
async fn send_text(socket: &mut WebSocket, json: String) -> bool {
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    matches!(r, Ok(Ok(())))
}

fn view_message(view: &AppView) -> anyhow::Result<String> {
    Ok(serde_json::to_string(
        &serde_json::json!({ "type": "view", "view": view }),
    )?)
}

async fn stream_state(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<SessionEvent>,
    state: AppState,
) -> anyhow::Result<()> {
    state.ws_clients.fetch_add(1, Ordering::Relaxed);
    let _guard = WsClientGuard(state.ws_clients.clone());
    tracing::info!("Client connected to state stream");

    let welcome = view_message(&state.view().await)?;
    if !send_text(&mut socket, welcome).await {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                let json = match result {
                    Ok(SessionEvent::Snapshot(snapshot)) => {
                        let view = AppView::from_snapshot(&snapshot, state.session.filter_substring());
                        view_message(&view)?
                    }
                    Ok(alert @ SessionEvent::Alert { .. }) => serde_json::to_string(&alert)?,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket /ws/state client lagged, skipped {} events", n);
                        view_message(&state.view().await)?
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if !send_text(&mut socket, json).await {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
        }
    }
    tracing::info!("Client disconnected from state stream");
    Ok(())
}
