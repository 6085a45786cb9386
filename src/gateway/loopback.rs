//! Loopback gateway for in-process LAN sessions.
//!
//! Keeps hosts and clients in the same process without touching the
//! network stack, the way a "null" online subsystem serves purely local
//! play. Hosts advertise into a shared [`LanDirectory`]; clients search and
//! join through it. Every accepted call queues its completion, which is
//! delivered on the next [`SessionGateway::poll_completions`].

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::{
    JoinResult, LocalPlayerId, OperationKind, SessionName, SessionSearch, SessionSearchResult,
    SessionSettings,
};

use super::{
    GatewayCompletion, ListenerHandle, NamedSession, NamedSessionState, SessionGateway,
};

/// Default connect address handed to joining clients.
pub const DEFAULT_HOST_ADDRESS: &str = "127.0.0.1:7777";

/// Default build id; hosts and clients must agree on it.
pub const DEFAULT_BUILD_ID: u32 = 1;

#[derive(Debug, Clone)]
struct AdvertisedSession {
    session_id: uuid::Uuid,
    owner: LocalPlayerId,
    host_address: String,
    settings: SessionSettings,
    open_public_slots: u32,
    started: bool,
}

impl AdvertisedSession {
    fn visible_to(&self, requester: LocalPlayerId, search: &SessionSearch) -> bool {
        self.owner != requester
            && self.settings.should_advertise
            && self.settings.is_lan_match == search.is_lan_query
            && (!search.presence_only || self.settings.uses_presence)
            && (!self.started || self.settings.allow_join_in_progress)
    }

    fn to_search_result(&self) -> SessionSearchResult {
        SessionSearchResult {
            session_id: self.session_id,
            owner: self.owner,
            build_unique_id: self.settings.build_unique_id,
            open_public_slots: self.open_public_slots,
            max_public_slots: self.settings.num_public_connections,
            ping_ms: 0,
            attributes: self.settings.advertised_attributes(),
        }
    }
}

/// Sessions advertised on the simulated local network.
///
/// Cheap to clone; all clones share one directory. Sessions are kept in
/// advertisement order so searches return them in that order.
#[derive(Debug, Clone, Default)]
pub struct LanDirectory {
    sessions: Arc<Mutex<Vec<AdvertisedSession>>>,
}

impl LanDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of advertised sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.with_sessions(|sessions| sessions.len())
    }

    /// Returns `true` when nothing is advertised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free public slots of an advertised session.
    #[must_use]
    pub fn open_slots(&self, session_id: uuid::Uuid) -> Option<u32> {
        self.with_sessions(|sessions| {
            sessions
                .iter()
                .find(|s| s.session_id == session_id)
                .map(|s| s.open_public_slots)
        })
    }

    fn with_sessions<R>(&self, f: impl FnOnce(&mut Vec<AdvertisedSession>) -> R) -> R {
        let mut guard = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn advertise(&self, session: AdvertisedSession) {
        self.with_sessions(|sessions| sessions.push(session));
    }

    fn withdraw(&self, session_id: uuid::Uuid) {
        self.with_sessions(|sessions| sessions.retain(|s| s.session_id != session_id));
    }

    fn mark_started(&self, session_id: uuid::Uuid) {
        self.with_sessions(|sessions| {
            if let Some(session) = sessions.iter_mut().find(|s| s.session_id == session_id) {
                session.started = true;
            }
        });
    }

    fn claim_slot(&self, session_id: uuid::Uuid) -> Result<String, JoinResult> {
        self.with_sessions(|sessions| {
            let session = sessions
                .iter_mut()
                .find(|s| s.session_id == session_id)
                .ok_or(JoinResult::SessionDoesNotExist)?;
            if session.open_public_slots == 0 {
                return Err(JoinResult::SessionIsFull);
            }
            session.open_public_slots -= 1;
            Ok(session.host_address.clone())
        })
    }

    fn release_slot(&self, session_id: uuid::Uuid) {
        self.with_sessions(|sessions| {
            if let Some(session) = sessions.iter_mut().find(|s| s.session_id == session_id) {
                session.open_public_slots = session
                    .open_public_slots
                    .saturating_add(1)
                    .min(session.settings.num_public_connections);
            }
        });
    }

    fn search(
        &self,
        requester: LocalPlayerId,
        search: &SessionSearch,
        build_unique_id: u32,
    ) -> Vec<SessionSearchResult> {
        let cap = usize::try_from(search.max_search_results).unwrap_or(usize::MAX);
        self.with_sessions(|sessions| {
            sessions
                .iter()
                .filter(|s| s.settings.build_unique_id == build_unique_id)
                .filter(|s| s.visible_to(requester, search))
                .take(cap)
                .map(AdvertisedSession::to_search_result)
                .collect()
        })
    }
}

#[derive(Debug, Clone)]
struct LocalSession {
    session_id: uuid::Uuid,
    is_host: bool,
    state: NamedSessionState,
    connect_address: Option<String>,
}

/// In-process backend for LAN play.
#[derive(Debug)]
pub struct LoopbackGateway {
    directory: LanDirectory,
    host_address: String,
    build_unique_id: u32,
    sessions: HashMap<SessionName, LocalSession>,
    listeners: BTreeMap<ListenerHandle, OperationKind>,
    next_listener: u64,
    queued: VecDeque<GatewayCompletion>,
}

impl LoopbackGateway {
    /// Creates a gateway advertising into `directory`.
    #[must_use]
    pub fn new(directory: LanDirectory) -> Self {
        Self {
            directory,
            host_address: DEFAULT_HOST_ADDRESS.to_string(),
            build_unique_id: DEFAULT_BUILD_ID,
            sessions: HashMap::new(),
            listeners: BTreeMap::new(),
            next_listener: 0,
            queued: VecDeque::new(),
        }
    }

    /// Sets the address clients resolve when joining sessions hosted here.
    #[must_use]
    pub fn with_host_address(mut self, host_address: impl Into<String>) -> Self {
        self.host_address = host_address.into();
        self
    }

    /// Sets the build id searches filter on.
    #[must_use]
    pub fn with_build_id(mut self, build_unique_id: u32) -> Self {
        self.build_unique_id = build_unique_id;
        self
    }

    /// The shared directory.
    #[must_use]
    pub fn directory(&self) -> &LanDirectory {
        &self.directory
    }

    /// Number of registered completion listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn has_listener(&self, kind: OperationKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }
}

impl SessionGateway for LoopbackGateway {
    fn is_online(&self) -> bool {
        false
    }

    fn add_completion_listener(&mut self, kind: OperationKind) -> ListenerHandle {
        if self.has_listener(kind) {
            tracing::warn!(operation = %kind, "duplicate completion listener registered");
        }
        self.next_listener += 1;
        let handle = ListenerHandle::new(self.next_listener);
        self.listeners.insert(handle, kind);
        handle
    }

    fn clear_completion_listener(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.remove(&handle).is_some()
    }

    fn create_session(
        &mut self,
        local_player: LocalPlayerId,
        session_name: &SessionName,
        settings: &SessionSettings,
    ) -> bool {
        if self.sessions.contains_key(session_name) {
            tracing::warn!(session = %session_name, "loopback session already exists");
            return false;
        }

        let session_id = uuid::Uuid::new_v4();
        if settings.should_advertise {
            self.directory.advertise(AdvertisedSession {
                session_id,
                owner: local_player,
                host_address: self.host_address.clone(),
                settings: settings.clone(),
                open_public_slots: settings.num_public_connections,
                started: false,
            });
        }
        self.sessions.insert(
            session_name.clone(),
            LocalSession {
                session_id,
                is_host: true,
                state: NamedSessionState::Pending,
                connect_address: Some(self.host_address.clone()),
            },
        );
        self.queued.push_back(GatewayCompletion::Create {
            session_name: session_name.clone(),
            success: true,
        });
        true
    }

    fn find_sessions(&mut self, local_player: LocalPlayerId, search: &SessionSearch) -> bool {
        let results = self
            .directory
            .search(local_player, search, self.build_unique_id);
        tracing::debug!(found = results.len(), "loopback search finished");
        self.queued.push_back(GatewayCompletion::Find {
            success: true,
            results,
        });
        true
    }

    fn join_session(
        &mut self,
        _local_player: LocalPlayerId,
        session_name: &SessionName,
        result: &SessionSearchResult,
    ) -> bool {
        if !result.is_valid() {
            return false;
        }

        let join_result = if self.sessions.contains_key(session_name) {
            JoinResult::AlreadyInSession
        } else {
            match self.directory.claim_slot(result.session_id) {
                Ok(address) => {
                    self.sessions.insert(
                        session_name.clone(),
                        LocalSession {
                            session_id: result.session_id,
                            is_host: false,
                            state: NamedSessionState::Pending,
                            connect_address: Some(address),
                        },
                    );
                    JoinResult::Success
                }
                Err(code) => code,
            }
        };
        self.queued.push_back(GatewayCompletion::Join {
            session_name: session_name.clone(),
            result: join_result,
        });
        true
    }

    fn start_session(&mut self, session_name: &SessionName) -> bool {
        let Some(session) = self.sessions.get_mut(session_name) else {
            return false;
        };
        session.state = NamedSessionState::InProgress;
        if session.is_host {
            self.directory.mark_started(session.session_id);
        }
        self.queued.push_back(GatewayCompletion::Start {
            session_name: session_name.clone(),
            success: true,
        });
        true
    }

    fn destroy_session(&mut self, session_name: &SessionName) -> bool {
        let Some(session) = self.sessions.remove(session_name) else {
            return false;
        };
        if session.is_host {
            self.directory.withdraw(session.session_id);
        } else {
            self.directory.release_slot(session.session_id);
        }
        self.queued.push_back(GatewayCompletion::Destroy {
            session_name: session_name.clone(),
            success: true,
        });
        true
    }

    fn named_session(&self, session_name: &SessionName) -> Option<NamedSession> {
        self.sessions.get(session_name).map(|session| NamedSession {
            name: session_name.clone(),
            session_id: session.session_id,
            is_host: session.is_host,
            state: session.state,
        })
    }

    fn resolved_connect_string(&self, session_name: &SessionName) -> Option<String> {
        self.sessions
            .get(session_name)
            .and_then(|session| session.connect_address.clone())
    }

    fn poll_completions(&mut self) -> Vec<GatewayCompletion> {
        let queued = std::mem::take(&mut self.queued);
        let mut delivered = Vec::with_capacity(queued.len());
        for completion in queued {
            if self.has_listener(completion.kind()) {
                delivered.push(completion);
            } else {
                tracing::trace!(operation = %completion.kind(), "dropping unobserved completion");
            }
        }
        delivered
    }
}
