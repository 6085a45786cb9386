//! Scriptable gateway for unit tests.
//!
//! Records every call and every listener registration, lets the test
//! decide which calls the backend accepts, and delivers only the
//! completions the test pushes.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{
    LocalPlayerId, OperationKind, SessionName, SessionSearch, SessionSearchResult,
    SessionSettings,
};

use super::{
    GatewayCompletion, ListenerHandle, NamedSession, NamedSessionState, SessionGateway,
};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GatewayCall {
    Create {
        session_name: SessionName,
        settings: SessionSettings,
    },
    Find {
        search: SessionSearch,
    },
    Join {
        session_name: SessionName,
        result: SessionSearchResult,
    },
    Start {
        session_name: SessionName,
    },
    Destroy {
        session_name: SessionName,
    },
}

impl GatewayCall {
    pub(crate) const fn kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Find { .. } => OperationKind::Find,
            Self::Join { .. } => OperationKind::Join,
            Self::Start { .. } => OperationKind::Start,
            Self::Destroy { .. } => OperationKind::Destroy,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingGateway {
    pub(crate) online: bool,
    pub(crate) rejected: BTreeSet<OperationKind>,
    pub(crate) existing: Option<NamedSession>,
    pub(crate) connect_string: Option<String>,
    pub(crate) calls: Vec<GatewayCall>,
    pub(crate) listeners: BTreeMap<ListenerHandle, OperationKind>,
    pub(crate) registered: Vec<(ListenerHandle, OperationKind)>,
    pub(crate) cleared: Vec<ListenerHandle>,
    pub(crate) duplicate_registrations: usize,
    next_listener: u64,
    pending: Vec<GatewayCompletion>,
}

impl RecordingGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pretends a session under `name` already exists.
    pub(crate) fn with_existing_session(mut self, name: &SessionName) -> Self {
        self.existing = Some(hosted(name));
        self
    }

    pub(crate) fn reject(&mut self, kind: OperationKind) {
        self.rejected.insert(kind);
    }

    /// Queues a completion for the next poll.
    pub(crate) fn complete(&mut self, completion: GatewayCompletion) {
        self.pending.push(completion);
    }

    pub(crate) fn calls_of(&self, kind: OperationKind) -> usize {
        self.calls.iter().filter(|c| c.kind() == kind).count()
    }

    pub(crate) fn has_listener(&self, kind: OperationKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    fn accept(&mut self, call: GatewayCall) -> bool {
        let kind = call.kind();
        self.calls.push(call);
        !self.rejected.contains(&kind)
    }
}

fn hosted(name: &SessionName) -> NamedSession {
    NamedSession {
        name: name.clone(),
        session_id: uuid::Uuid::new_v4(),
        is_host: true,
        state: NamedSessionState::Pending,
    }
}

impl SessionGateway for RecordingGateway {
    fn is_online(&self) -> bool {
        self.online
    }

    fn add_completion_listener(&mut self, kind: OperationKind) -> ListenerHandle {
        if self.has_listener(kind) {
            self.duplicate_registrations += 1;
        }
        self.next_listener += 1;
        let handle = ListenerHandle::new(self.next_listener);
        self.listeners.insert(handle, kind);
        self.registered.push((handle, kind));
        handle
    }

    fn clear_completion_listener(&mut self, handle: ListenerHandle) -> bool {
        self.cleared.push(handle);
        self.listeners.remove(&handle).is_some()
    }

    fn create_session(
        &mut self,
        _local_player: LocalPlayerId,
        session_name: &SessionName,
        settings: &SessionSettings,
    ) -> bool {
        let accepted = self.accept(GatewayCall::Create {
            session_name: session_name.clone(),
            settings: settings.clone(),
        });
        if accepted {
            self.existing = Some(hosted(session_name));
        }
        accepted
    }

    fn find_sessions(&mut self, _local_player: LocalPlayerId, search: &SessionSearch) -> bool {
        self.accept(GatewayCall::Find {
            search: search.clone(),
        })
    }

    fn join_session(
        &mut self,
        _local_player: LocalPlayerId,
        session_name: &SessionName,
        result: &SessionSearchResult,
    ) -> bool {
        self.accept(GatewayCall::Join {
            session_name: session_name.clone(),
            result: result.clone(),
        })
    }

    fn start_session(&mut self, session_name: &SessionName) -> bool {
        self.accept(GatewayCall::Start {
            session_name: session_name.clone(),
        })
    }

    fn destroy_session(&mut self, session_name: &SessionName) -> bool {
        self.accept(GatewayCall::Destroy {
            session_name: session_name.clone(),
        })
    }

    fn named_session(&self, session_name: &SessionName) -> Option<NamedSession> {
        self.existing
            .as_ref()
            .filter(|session| session.name == *session_name)
            .cloned()
    }

    fn resolved_connect_string(&self, _session_name: &SessionName) -> Option<String> {
        self.connect_string.clone()
    }

    fn poll_completions(&mut self) -> Vec<GatewayCompletion> {
        let pending = std::mem::take(&mut self.pending);
        let mut delivered = Vec::with_capacity(pending.len());
        for completion in pending {
            if let GatewayCompletion::Destroy { success: true, .. } = completion {
                self.existing = None;
            }
            if self.has_listener(completion.kind()) {
                delivered.push(completion);
            }
        }
        delivered
    }
}
