//! In-flight bookkeeping: one pending slot per operation kind, plus the
//! follow-up queued behind a destroy.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::domain::{OperationKind, SessionIntent};
use crate::gateway::ListenerHandle;

/// An issued gateway call awaiting its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCall {
    /// Listener registered for the call's completion.
    pub listener: ListenerHandle,
    /// When the call was issued.
    pub issued_at: Instant,
}

/// Pending slots keyed by operation kind.
///
/// A slot is filled immediately before a gateway call and emptied exactly
/// once: [`Self::release`] takes the call out, so a second release of the
/// same kind yields `None`.
#[derive(Debug, Default)]
pub struct PendingOperations {
    slots: BTreeMap<OperationKind, PendingCall>,
}

impl PendingOperations {
    /// Creates an empty set of slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a call of `kind` is outstanding.
    #[must_use]
    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Fills the slot for `kind`. Returns the call it displaced, which is
    /// always `None` when callers check [`Self::is_pending`] first.
    pub fn begin(&mut self, kind: OperationKind, listener: ListenerHandle, now: Instant) -> Option<PendingCall> {
        self.slots.insert(
            kind,
            PendingCall {
                listener,
                issued_at: now,
            },
        )
    }

    /// Empties the slot for `kind`.
    pub fn release(&mut self, kind: OperationKind) -> Option<PendingCall> {
        self.slots.remove(&kind)
    }

    /// Kinds whose call was issued at least `timeout` before `now`.
    #[must_use]
    pub fn expired(&self, now: Instant, timeout: Duration) -> Vec<OperationKind> {
        self.slots
            .iter()
            .filter(|(_, call)| now.saturating_duration_since(call.issued_at) >= timeout)
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Kinds with an outstanding call, in [`OperationKind`] order.
    #[must_use]
    pub fn kinds(&self) -> Vec<OperationKind> {
        self.slots.keys().copied().collect()
    }
}

/// Work queued to run once the outstanding destroy completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FollowUp {
    /// Nothing queued.
    #[default]
    None,
    /// Create a session with this intent after the destroy succeeds.
    RecreateWith(SessionIntent),
}

impl FollowUp {
    /// Returns `true` if a recreate is queued.
    #[must_use]
    pub const fn is_recreate(&self) -> bool {
        matches!(self, Self::RecreateWith(_))
    }

    /// Takes the follow-up, leaving [`FollowUp::None`].
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn release_happens_once() {
        let mut pending = PendingOperations::new();
        let now = Instant::now();
        assert!(pending.begin(OperationKind::Find, ListenerHandle::new(1), now).is_none());
        assert!(pending.is_pending(OperationKind::Find));

        assert!(pending.release(OperationKind::Find).is_some());
        assert!(pending.release(OperationKind::Find).is_none());
        assert!(!pending.is_pending(OperationKind::Find));
    }

    #[test]
    fn expired_respects_timeout() {
        let mut pending = PendingOperations::new();
        let start = Instant::now();
        pending.begin(OperationKind::Create, ListenerHandle::new(1), start);
        pending.begin(OperationKind::Join, ListenerHandle::new(2), start + Duration::from_secs(5));

        let later = start + Duration::from_secs(10);
        assert_eq!(
            pending.expired(later, Duration::from_secs(10)),
            vec![OperationKind::Create]
        );
        assert_eq!(
            pending.expired(later, Duration::from_secs(5)),
            vec![OperationKind::Create, OperationKind::Join]
        );
    }

    #[test]
    fn follow_up_take_resets() {
        let Ok(intent) = SessionIntent::new(2, "Ranked") else {
            panic!("valid intent");
        };
        let mut follow_up = FollowUp::RecreateWith(intent.clone());
        assert!(follow_up.is_recreate());
        assert_eq!(follow_up.take(), FollowUp::RecreateWith(intent));
        assert_eq!(follow_up, FollowUp::None);
    }
}
