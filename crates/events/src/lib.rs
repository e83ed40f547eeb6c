//! Broadcast events for live execution observers.
//!
//! The orchestrator publishes one [`Event`] per state change; the server
//! forwards them to WebSocket clients. Delivery is best-effort with no replay.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
