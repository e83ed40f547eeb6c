use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, MissedTickBehavior};

use events::EventBus;

use crate::subscription::Subscription;

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct WsState {
    pub event_bus: EventBus,
}

impl WsState {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_client(socket, state))
}

type Outbound = SplitSink<WebSocket, Message>;

/// Returns false once the peer is gone.
async fn send_json<T: Serialize>(outbound: &mut Outbound, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => outbound.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WebSocket frame");
            true
        }
    }
}

async fn serve_client(socket: WebSocket, state: Arc<WsState>) {
    let (mut outbound, mut inbound) = socket.split();
    let mut events = state.event_bus.subscribe();
    let mut subscription = Subscription::default();

    let mut keepalive = interval(KEEPALIVE_INTERVAL);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
    keepalive.reset();

    tracing::debug!(
        subscribers = state.event_bus.subscriber_count(),
        "WebSocket client connected"
    );

    loop {
        tokio::select! {
            _ = keepalive.tick() => {
                if outbound.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            received = events.recv() => match received {
                Ok(envelope) => {
                    if subscription.wants(&envelope) && !send_json(&mut outbound, &envelope).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "WebSocket client lagged behind the event bus");
                }
                Err(RecvError::Closed) => break,
            },

            frame = inbound.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let reply = subscription.handle_text(text.as_str());
                    if !send_json(&mut outbound, &reply).await {
                        break;
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    if outbound.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_shares_bus() {
        let bus = EventBus::new();
        let state = WsState::new(bus.clone());
        let _rx = state.event_bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }
}
