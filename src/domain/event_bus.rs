//! Outcome Notifier: broadcast channel for operation outcomes.
//!
//! [`OutcomeNotifier`] wraps a [`tokio::sync::broadcast`] channel. The
//! coordinator publishes every terminal [`SessionOutcome`] through it and
//! any number of listeners (the driver's menu flow, WebSocket clients,
//! tests) subscribe, either to everything or to selected operation kinds.

use tokio::sync::broadcast;

use super::subscription::{OutcomeFilter, OutcomeSubscription};
use super::{OperationKind, SessionOutcome};

/// Broadcast bus for [`SessionOutcome`]s.
///
/// Publishing never blocks: when the ring buffer is full the oldest
/// outcomes are dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct OutcomeNotifier {
    sender: broadcast::Sender<SessionOutcome>,
}

impl OutcomeNotifier {
    /// Creates a new `OutcomeNotifier` with the given channel capacity.
    ///
    /// A capacity of zero is bumped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an outcome to all subscribers.
    ///
    /// Returns the number of receivers that received the outcome. If there
    /// are no active receivers, the outcome is silently dropped.
    pub fn publish(&self, outcome: SessionOutcome) -> usize {
        tracing::debug!(
            operation = %outcome.kind(),
            outcome = outcome.event_type_str(),
            success = outcome.is_success(),
            "publishing outcome"
        );
        self.sender.send(outcome).unwrap_or(0)
    }

    /// Creates a raw receiver for all future outcomes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionOutcome> {
        self.sender.subscribe()
    }

    /// Subscribes to every operation kind.
    #[must_use]
    pub fn subscribe_all(&self) -> OutcomeSubscription {
        OutcomeSubscription::new(self.sender.subscribe(), OutcomeFilter::all())
    }

    /// Subscribes to the given operation kinds only.
    #[must_use]
    pub fn subscribe_to(&self, kinds: &[OperationKind]) -> OutcomeSubscription {
        OutcomeSubscription::new(self.sender.subscribe(), OutcomeFilter::only(kinds))
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
