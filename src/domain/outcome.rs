//! Terminal outcomes of session operations.
//!
//! Every operation the coordinator accepts ends in exactly one
//! [`SessionOutcome`], published through the [`super::OutcomeNotifier`].
//! Failures are outcome values, never coordinator states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SessionSearchResult;

/// The five session operations, one pending slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// CreateSession.
    Create,
    /// FindSessions.
    Find,
    /// JoinSession.
    Join,
    /// StartSession.
    Start,
    /// DestroySession.
    Destroy,
}

impl OperationKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Find,
        Self::Join,
        Self::Start,
        Self::Destroy,
    ];

    /// Returns the kind as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Find => "find",
            Self::Join => "join",
            Self::Start => "start",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown operation {s:?}"))
    }
}

/// Result code of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinResult {
    /// Joined; the address is resolved.
    Success,
    /// No free public slot left.
    SessionIsFull,
    /// The session vanished before the join went through.
    SessionDoesNotExist,
    /// Joined, but no connect address could be resolved.
    CouldNotRetrieveAddress,
    /// A session under the same name already exists locally.
    AlreadyInSession,
    /// Anything else, including failures to issue the join.
    UnknownError,
}

impl JoinResult {
    /// Returns `true` only for [`JoinResult::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for JoinResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "Success",
            Self::SessionIsFull => "SessionIsFull",
            Self::SessionDoesNotExist => "SessionDoesNotExist",
            Self::CouldNotRetrieveAddress => "CouldNotRetrieveAddress",
            Self::AlreadyInSession => "AlreadyInSession",
            Self::UnknownError => "UnknownError",
        };
        f.write_str(s)
    }
}

/// Outcome published once per accepted operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// CreateSession finished.
    Created {
        /// Whether the session now exists.
        success: bool,
    },

    /// FindSessions finished.
    SessionsFound {
        /// Results in backend order; empty on failure.
        results: Vec<SessionSearchResult>,
        /// Whether the search itself succeeded.
        success: bool,
    },

    /// JoinSession finished.
    Joined {
        /// Join result; [`JoinResult::UnknownError`] whenever `address` is
        /// empty.
        result: JoinResult,
        /// Connect address of the joined session.
        address: String,
    },

    /// StartSession finished.
    Started {
        /// Whether the session is now in progress.
        success: bool,
    },

    /// DestroySession finished.
    Destroyed {
        /// Whether the session is gone.
        success: bool,
    },
}

impl SessionOutcome {
    /// Returns the operation this outcome terminates.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Created { .. } => OperationKind::Create,
            Self::SessionsFound { .. } => OperationKind::Find,
            Self::Joined { .. } => OperationKind::Join,
            Self::Started { .. } => OperationKind::Start,
            Self::Destroyed { .. } => OperationKind::Destroy,
        }
    }

    /// Returns `true` when the operation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        match self {
            Self::Created { success }
            | Self::SessionsFound { success, .. }
            | Self::Started { success }
            | Self::Destroyed { success } => *success,
            Self::Joined { result, .. } => result.is_success(),
        }
    }

    /// The failure outcome for `kind`, used for synchronous rejections
    /// and expired calls.
    #[must_use]
    pub fn failure(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Create => Self::Created { success: false },
            OperationKind::Find => Self::SessionsFound {
                results: Vec::new(),
                success: false,
            },
            OperationKind::Join => Self::Joined {
                result: JoinResult::UnknownError,
                address: String::new(),
            },
            OperationKind::Start => Self::Started { success: false },
            OperationKind::Destroy => Self::Destroyed { success: false },
        }
    }

    /// Returns the outcome type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::SessionsFound { .. } => "sessions_found",
            Self::Joined { .. } => "joined",
            Self::Started { .. } => "started",
            Self::Destroyed { .. } => "destroyed",
        }
    }
}
