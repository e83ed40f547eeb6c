//! WebSocket fan-out of bus events.

mod handler;
mod messages;
mod subscription;

pub use handler::{ws_handler, WsState};
pub use messages::{ClientMessage, ServerMessage, SubscriptionFilter};
pub use subscription::Subscription;
