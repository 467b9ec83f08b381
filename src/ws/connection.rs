//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection: inbound
//! frames go to the [`EventRouter`], queued [`HubEvent`]s go out to the
//! client, and a ping/idle timer detects dead peers. However the loop
//! ends, the connection is detached through the router's disconnect
//! handler.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use super::messages::{WsFrame, encode};
use crate::domain::{ConnectionId, HubEvent};
use crate::service::{EventRouter, InboundEvent};

/// Per-connection transport settings.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Depth of the outbound queue; events beyond it are dropped.
    pub outbound_buffer: usize,
    /// Period between keep-alive pings.
    pub ping_interval: Duration,
    /// Silence after which the peer is considered gone.
    pub ping_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            outbound_buffer: 256,
            ping_interval: Duration::from_secs(25),
            ping_timeout: Duration::from_secs(60),
        }
    }
}

/// Runs the read/write loop for a single WebSocket connection.
pub async fn run_connection(socket: WebSocket, router: EventRouter, settings: ConnectionSettings) {
    let conn = ConnectionId::new();
    let (outbox, mut inbox) = mpsc::channel::<Arc<HubEvent>>(settings.outbound_buffer.max(1));
    router.registry().attach(conn, outbox).await;
    tracing::info!(connection_id = %conn, "ws connection opened");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // `interval_at` panics on a zero period.
    let period = settings.ping_interval.max(Duration::from_millis(10));
    let mut ping = tokio::time::interval_at(Instant::now() + period, period);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let idle = tokio::time::sleep(settings.ping_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        idle.as_mut().reset(Instant::now() + settings.ping_timeout);
                        match msg {
                            Message::Text(text) => handle_text(&router, conn, text.as_str()).await,
                            Message::Close(_) => break,
                            _ => {}
                        }
                    }
                    Some(Err(err)) => {
                        tracing::debug!(connection_id = %conn, error = %err, "ws read failed");
                        break;
                    }
                    None => break,
                }
            }
            // Event queued for this connection
            event = inbox.recv() => {
                let Some(event) = event else { break };
                match encode(&event) {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(connection_id = %conn, error = %err, "dropping unencodable event");
                    }
                }
            }
            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
            () = &mut idle => {
                tracing::info!(connection_id = %conn, "ws connection idle, closing");
                break;
            }
        }
    }

    let _ = router.handle(conn, InboundEvent::Disconnect).await;
    tracing::debug!(connection_id = %conn, "ws connection closed");
}

async fn handle_text(router: &EventRouter, conn: ConnectionId, text: &str) {
    match WsFrame::decode(text) {
        Ok(frame) => router.route(conn, &frame.event, frame.data).await,
        Err(err) => router.reject(conn, &err).await,
    }
}
