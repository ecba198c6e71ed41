// WebSocket handlers: metric updates and lifecycle events

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, Instant, interval_at, timeout};

use super::AppState;
use crate::lifecycle::{EntityFilter, LifecycleSimulator};
use crate::metrics_sim::{MetricsSimulator, MetricsUpdate};

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

type WsSender = SplitSink<WebSocket, Message>;

/// Decrements the ws connection count on drop (connect = +1, drop = -1).
struct WsConnectionGuard(Arc<AtomicUsize>);

impl WsConnectionGuard {
    fn register(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::Relaxed);
        Self(count)
    }
}

impl Drop for WsConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// False when the client is gone or too slow.
async fn send_message(sender: &mut WsSender, msg: Message) -> bool {
    matches!(timeout(WS_SEND_TIMEOUT, sender.send(msg)).await, Ok(Ok(())))
}

async fn send_json<T: Serialize>(sender: &mut WsSender, value: &T) -> anyhow::Result<bool> {
    let json = serde_json::to_string(value)?;
    Ok(send_message(sender, Message::Text(json.into())).await)
}

pub(super) async fn ws_metrics(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let metrics = state.metrics.clone();
    let conn_count = state.ws_connections.clone();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_metrics(socket, metrics, conn_count).await {
            tracing::info!("Metrics stream error: {}", e);
        }
    })
}

/// Holds a metrics lease for the lifetime of the connection, so the ticker stops
/// once the last viewer disconnects.
async fn stream_metrics(
    socket: WebSocket,
    metrics: Arc<MetricsSimulator>,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    let _guard = WsConnectionGuard::register(conn_count);
    let _lease = metrics.acquire();
    let mut updates = metrics.subscribe();
    tracing::info!("Client connected to metrics stream");

    let (mut sender, mut receiver) = socket.split();
    let initial = [
        MetricsUpdate::Resources(metrics.snapshot()),
        MetricsUpdate::Interfaces(metrics.interfaces()),
        MetricsUpdate::Processes(metrics.processes()),
    ];
    for update in &initial {
        if !send_json(&mut sender, update).await? {
            return Ok(());
        }
    }

    let mut ping_interval = interval_at(Instant::now() + WS_PING_INTERVAL, WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            update = updates.recv() => {
                match update {
                    Some(update) => {
                        if !send_json(&mut sender, &update).await? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            _ = ping_interval.tick() => {
                if !send_message(&mut sender, Message::Ping(Bytes::new())).await {
                    break;
                }
            }
        }
    }
    tracing::info!("Client disconnected from metrics stream");
    Ok(())
}

pub(super) async fn ws_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let lifecycle = state.lifecycle.clone();
    let conn_count = state.ws_connections.clone();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_events(socket, lifecycle, conn_count).await {
            tracing::info!("Events stream error: {}", e);
        }
    })
}

async fn stream_events(
    socket: WebSocket,
    lifecycle: Arc<LifecycleSimulator>,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    let _guard = WsConnectionGuard::register(conn_count);
    // Subscribe before reading the registry so no change falls between the two.
    let mut events = lifecycle.subscribe();
    tracing::info!("Client connected to events stream");

    let (mut sender, mut receiver) = socket.split();
    let welcome = serde_json::json!({
        "type": "registry",
        "entities": lifecycle.list_entities(&EntityFilter::all()),
    });
    if !send_json(&mut sender, &welcome).await? {
        return Ok(());
    }

    let mut ping_interval = interval_at(Instant::now() + WS_PING_INTERVAL, WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => {
                        if !send_json(&mut sender, &event).await? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            _ = ping_interval.tick() => {
                if !send_message(&mut sender, Message::Ping(Bytes::new())).await {
                    break;
                }
            }
        }
    }
    Ok(())
}
