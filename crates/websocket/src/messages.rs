use serde::{Deserialize, Serialize};
use uuid::Uuid;

use events::EventEnvelope;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe {
        #[serde(default)]
        filter: Option<SubscriptionFilter>,
    },
    Unsubscribe,
    Ping,
}

/// Control replies. Bus events are sent as bare envelopes, not wrapped here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Subscribed { filter: Option<SubscriptionFilter> },
    Unsubscribed,
    Pong,
    Error { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFilter {
    pub execution_ids: Option<Vec<Uuid>>,
}

impl SubscriptionFilter {
    pub fn for_execution(execution_id: Uuid) -> Self {
        Self {
            execution_ids: Some(vec![execution_id]),
        }
    }

    /// Events that belong to no execution (agent performance) always match.
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        match (&self.execution_ids, envelope.event.execution_id()) {
            (Some(ids), Some(execution_id)) => ids.contains(&execution_id),
            _ => true,
        }
    }
}
