//! Per-listener outcome filtering.
//!
//! [`OutcomeFilter`] tracks which operation kinds a listener cares about;
//! [`OutcomeSubscription`] pairs it with a broadcast receiver so a listener
//! only ever sees the outcomes it asked for.

use std::collections::BTreeSet;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use super::{OperationKind, SessionOutcome};

/// Set of operation kinds a listener is subscribed to.
#[derive(Debug, Clone, Default)]
pub struct OutcomeFilter {
    /// Subscribed kinds. Ignored while `subscribe_all` is set.
    kinds: BTreeSet<OperationKind>,
    /// Wildcard subscription (`"*"`).
    subscribe_all: bool,
}

impl OutcomeFilter {
    /// Creates a filter that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter that matches every kind.
    #[must_use]
    pub fn all() -> Self {
        Self {
            kinds: BTreeSet::new(),
            subscribe_all: true,
        }
    }

    /// Creates a filter matching exactly `kinds`.
    #[must_use]
    pub fn only(kinds: &[OperationKind]) -> Self {
        let mut filter = Self::new();
        filter.subscribe(kinds, false);
        filter
    }

    /// Adds kinds to the filter. `wildcard` enables the match-all flag.
    pub fn subscribe(&mut self, kinds: &[OperationKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.kinds.extend(kinds.iter().copied());
    }

    /// Removes kinds from the filter.
    pub fn unsubscribe(&mut self, kinds: &[OperationKind]) {
        for kind in kinds {
            self.kinds.remove(kind);
        }
    }

    /// Drops every kind and the wildcard.
    pub fn clear(&mut self) {
        self.kinds.clear();
        self.subscribe_all = false;
    }

    /// Returns `true` if outcomes of `kind` pass the filter.
    #[must_use]
    pub fn matches(&self, kind: OperationKind) -> bool {
        self.subscribe_all || self.kinds.contains(&kind)
    }

    /// Returns the number of explicitly subscribed kinds.
    #[must_use]
    pub fn count(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

/// A broadcast receiver that skips outcomes outside its filter.
#[derive(Debug)]
pub struct OutcomeSubscription {
    receiver: broadcast::Receiver<SessionOutcome>,
    filter: OutcomeFilter,
}

impl OutcomeSubscription {
    /// Wraps a receiver with a filter.
    #[must_use]
    pub fn new(receiver: broadcast::Receiver<SessionOutcome>, filter: OutcomeFilter) -> Self {
        Self { receiver, filter }
    }

    /// Mutable access to the filter, for changing subscriptions on the fly.
    pub fn filter_mut(&mut self) -> &mut OutcomeFilter {
        &mut self.filter
    }

    /// Waits for the next matching outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::Lagged`] when outcomes were dropped for this
    /// receiver and [`RecvError::Closed`] once every sender is gone.
    pub async fn recv(&mut self) -> Result<SessionOutcome, RecvError> {
        loop {
            let outcome = self.receiver.recv().await?;
            if self.filter.matches(outcome.kind()) {
                return Ok(outcome);
            }
        }
    }

    /// Returns the next matching outcome without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TryRecvError::Empty`] when nothing matching is queued,
    /// plus the lag and close conditions of the underlying receiver.
    pub fn try_recv(&mut self) -> Result<SessionOutcome, TryRecvError> {
        loop {
            let outcome = self.receiver.try_recv()?;
            if self.filter.matches(outcome.kind()) {
                return Ok(outcome);
            }
        }
    }

    /// Collects every matching outcome that is already queued.
    ///
    /// Lagged outcomes are skipped with a warning.
    pub fn drain(&mut self) -> Vec<SessionOutcome> {
        let mut outcomes = Vec::new();
        loop {
            match self.try_recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "outcome listener lagged behind notifier");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        outcomes
    }
}
