//! Backend Gateway: the capability interface the coordinator depends on.
//!
//! A backend accepts or rejects each call synchronously (`bool`) and later
//! signals completion. Completions are pulled on the control thread with
//! [`SessionGateway::poll_completions`]; a completion only reaches the
//! coordinator while a listener for its [`OperationKind`] is registered.
//!
//! [`LoopbackGateway`] is the in-process LAN backend used when no online
//! subsystem is available.

pub mod loopback;
#[cfg(test)]
pub(crate) mod recording;

use std::fmt;

use serde::Serialize;

use crate::domain::{
    JoinResult, LocalPlayerId, OperationKind, SessionName, SessionSearch, SessionSearchResult,
    SessionSettings,
};

pub use loopback::{LanDirectory, LoopbackGateway};

/// Handle of a registered completion listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    /// Wraps a raw handle value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a named session as the backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedSessionState {
    /// Created, not started yet.
    Pending,
    /// Started.
    InProgress,
}

/// A named session held by the backend for the local player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedSession {
    /// Name the session is stored under.
    pub name: SessionName,
    /// Backend id of the session.
    pub session_id: uuid::Uuid,
    /// Whether the local player hosts it.
    pub is_host: bool,
    /// Current lifecycle state.
    pub state: NamedSessionState,
}

/// Asynchronous completion signal of a backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCompletion {
    /// CreateSession finished.
    Create {
        /// Session the call was issued for.
        session_name: SessionName,
        /// Whether the session was created.
        success: bool,
    },
    /// FindSessions finished.
    Find {
        /// Whether the search succeeded.
        success: bool,
        /// Results in backend order.
        results: Vec<SessionSearchResult>,
    },
    /// JoinSession finished.
    Join {
        /// Session the call was issued for.
        session_name: SessionName,
        /// Backend result code.
        result: JoinResult,
    },
    /// StartSession finished.
    Start {
        /// Session the call was issued for.
        session_name: SessionName,
        /// Whether the session started.
        success: bool,
    },
    /// DestroySession finished.
    Destroy {
        /// Session the call was issued for.
        session_name: SessionName,
        /// Whether the session is gone.
        success: bool,
    },
}

impl GatewayCompletion {
    /// Returns the operation kind this completion belongs to.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Find { .. } => OperationKind::Find,
            Self::Join { .. } => OperationKind::Join,
            Self::Start { .. } => OperationKind::Start,
            Self::Destroy { .. } => OperationKind::Destroy,
        }
    }

    /// Returns the session name the completion refers to. Searches are not
    /// tied to a name.
    #[must_use]
    pub fn session_name(&self) -> Option<&SessionName> {
        match self {
            Self::Create { session_name, .. }
            | Self::Join { session_name, .. }
            | Self::Start { session_name, .. }
            | Self::Destroy { session_name, .. } => Some(session_name),
            Self::Find { .. } => None,
        }
    }
}

/// Session primitives of an online-services backend.
///
/// Each call returns `true` when the backend accepted it; the result then
/// arrives later through [`Self::poll_completions`]. Registering a second
/// listener for a kind that already has one is a contract violation.
pub trait SessionGateway {
    /// Returns `false` when no online subsystem is present; every create
    /// and search is then issued in LAN mode.
    fn is_online(&self) -> bool;

    /// Registers the completion listener for `kind`.
    fn add_completion_listener(&mut self, kind: OperationKind) -> ListenerHandle;

    /// Removes a listener. Returns `false` for an unknown handle.
    fn clear_completion_listener(&mut self, handle: ListenerHandle) -> bool;

    /// Starts creating `session_name`.
    fn create_session(
        &mut self,
        local_player: LocalPlayerId,
        session_name: &SessionName,
        settings: &SessionSettings,
    ) -> bool;

    /// Starts a search.
    fn find_sessions(&mut self, local_player: LocalPlayerId, search: &SessionSearch) -> bool;

    /// Starts joining `result` under `session_name`.
    fn join_session(
        &mut self,
        local_player: LocalPlayerId,
        session_name: &SessionName,
        result: &SessionSearchResult,
    ) -> bool;

    /// Starts the named session.
    fn start_session(&mut self, session_name: &SessionName) -> bool;

    /// Starts destroying the named session.
    fn destroy_session(&mut self, session_name: &SessionName) -> bool;

    /// Returns the named session if the backend holds one.
    fn named_session(&self, session_name: &SessionName) -> Option<NamedSession>;

    /// Returns the connect address of a joined session, if resolved.
    fn resolved_connect_string(&self, session_name: &SessionName) -> Option<String>;

    /// Drains completions for kinds with a registered listener.
    fn poll_completions(&mut self) -> Vec<GatewayCompletion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_kind_and_name() {
        let completion = GatewayCompletion::Destroy {
            session_name: SessionName::game(),
            success: true,
        };
        assert_eq!(completion.kind(), OperationKind::Destroy);
        assert_eq!(completion.session_name(), Some(&SessionName::game()));

        let search = GatewayCompletion::Find {
            success: false,
            results: Vec::new(),
        };
        assert_eq!(search.kind(), OperationKind::Find);
        assert!(search.session_name().is_none());
    }

    #[test]
    fn listener_handle_round_trips() {
        let handle = ListenerHandle::new(42);
        assert_eq!(handle.get(), 42);
        assert_eq!(handle.to_string(), "#42");
    }
}
