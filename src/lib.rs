//! # multiplayer-sessions
//!
//! Session lifecycle coordination for multiplayer matchmaking.
//!
//! The [`service::SessionCoordinator`] creates, finds, joins, starts and
//! destroys one named session against an online-services backend reached
//! through [`gateway::SessionGateway`]. It keeps at most one call per
//! operation in flight, replays a create after tearing down an existing
//! session, and publishes exactly one outcome per operation on the
//! [`domain::OutcomeNotifier`].
//!
//! [`gateway::LoopbackGateway`] is an in-process LAN backend. The binary
//! wires it to a [`driver::SessionDriver`] and exposes the driver over
//! REST and WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── SessionDriver (driver)      one task, owns everything below
//!     │     ├── MenuFlow (service/)
//!     │     └── SessionCoordinator (service/)
//!     │
//!     ├── OutcomeNotifier (domain/)
//!     │
//!     └── SessionGateway (gateway/)
//!           └── LoopbackGateway ── LanDirectory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod service;
pub mod ws;
