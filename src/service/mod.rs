//! Service layer: session lifecycle orchestration.
//!
//! [`SessionCoordinator`] issues session operations against a
//! [`crate::gateway::SessionGateway`] and publishes outcomes through the
//! [`crate::domain::OutcomeNotifier`]. [`MenuFlow`] drives it the way the
//! host/join menu does.

pub mod coordinator;
pub mod matchmaking;
pub mod menu;
pub mod pending;

pub use coordinator::{CoordinatorOptions, CoordinatorStatus, SessionCoordinator};
pub use matchmaking::{select_joinable, try_join_session};
pub use menu::{MenuFlow, MenuSettings, TravelDirective};
pub use pending::{FollowUp, PendingCall, PendingOperations};
