//! Shared application state injected into all Axum handlers.

use crate::domain::OutcomeNotifier;
use crate::driver::DriverHandle;
use crate::service::MenuSettings;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Command channel into the control thread.
    pub driver: DriverHandle,
    /// Outcome notifier for WebSocket subscriptions.
    pub notifier: OutcomeNotifier,
    /// Menu configuration, served by `/config/menu`.
    pub menu: MenuSettings,
}
