use events::EventEnvelope;

use crate::messages::{ClientMessage, ServerMessage, SubscriptionFilter};

/// Per-connection delivery state, driven by control messages from the client.
#[derive(Debug, Clone)]
pub struct Subscription {
    active: bool,
    filter: Option<SubscriptionFilter>,
}

impl Default for Subscription {
    /// New connections receive every event until they narrow or unsubscribe.
    fn default() -> Self {
        Self {
            active: true,
            filter: None,
        }
    }
}

impl Subscription {
    pub fn wants(&self, envelope: &EventEnvelope) -> bool {
        self.active
            && self
                .filter
                .as_ref()
                .map_or(true, |filter| filter.matches(envelope))
    }

    /// Apply a raw text frame and produce the reply for the client.
    pub fn handle_text(&mut self, text: &str) -> ServerMessage {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => self.apply(message),
            Err(e) => ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            },
        }
    }

    pub fn apply(&mut self, message: ClientMessage) -> ServerMessage {
        match message {
            ClientMessage::Subscribe { filter } => {
                self.active = true;
                self.filter = filter.clone();
                ServerMessage::Subscribed { filter }
            }
            ClientMessage::Unsubscribe => {
                self.active = false;
                self.filter = None;
                ServerMessage::Unsubscribed
            }
            ClientMessage::Ping => ServerMessage::Pong,
        }
    }
}
