//! WebSocket layer: connection handling and message routing.
//!
//! The WebSocket endpoint at `/ws` streams session outcomes. Clients pick
//! the operations they care about with `subscribe` / `unsubscribe`
//! commands and can ask for the driver status.

pub mod connection;
pub mod handler;
pub mod messages;
