//! Session lifecycle coordinator: issues session operations against a
//! [`SessionGateway`] and publishes exactly one outcome per operation.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::{
    JoinResult, LocalPlayerId, OperationKind, OutcomeNotifier, SessionIntent, SessionName,
    SessionOutcome, SessionSearch, SessionSearchResult, SessionSettings,
};
use crate::gateway::{GatewayCompletion, NamedSession, SessionGateway};

use super::pending::{FollowUp, PendingOperations};

/// Fixed parameters of a coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Name every session call is issued for.
    pub session_name: SessionName,
    /// Identity passed with create, find and join calls.
    pub local_player: LocalPlayerId,
    /// Build id stamped into created sessions.
    pub build_unique_id: u32,
    /// Give up on a call after this long. `None` waits forever.
    pub operation_timeout: Option<Duration>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            session_name: SessionName::game(),
            local_player: LocalPlayerId::new(),
            build_unique_id: 1,
            operation_timeout: None,
        }
    }
}

/// Snapshot of the coordinator for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorStatus {
    /// Reserved session name.
    pub session_name: SessionName,
    /// Local player identity.
    pub local_player: LocalPlayerId,
    /// Whether calls go out in LAN mode.
    pub lan: bool,
    /// Operation kinds with an outstanding call.
    pub pending: Vec<OperationKind>,
    /// Whether a create is waiting on the outstanding destroy.
    pub recreate_pending: bool,
    /// The named session the backend holds, if any.
    pub session: Option<NamedSession>,
    /// Most recent hosting intent.
    pub intent: Option<SessionIntent>,
}

/// Coordinates create/find/join/start/destroy against one backend.
///
/// Single-threaded by construction: every method takes `&mut self` and is
/// meant to run on the one control thread that also calls
/// [`Self::poll_gateway`]. Per operation kind at most one gateway call is
/// outstanding. The only operation chained from a completion is the
/// create queued behind a destroy.
#[derive(Debug)]
pub struct SessionCoordinator<G> {
    gateway: G,
    notifier: OutcomeNotifier,
    options: CoordinatorOptions,
    pending: PendingOperations,
    follow_up: FollowUp,
    last_intent: Option<SessionIntent>,
    last_settings: Option<SessionSettings>,
}

impl<G: SessionGateway> SessionCoordinator<G> {
    /// Creates a coordinator publishing into `notifier`.
    #[must_use]
    pub fn new(gateway: G, notifier: OutcomeNotifier, options: CoordinatorOptions) -> Self {
        Self {
            gateway,
            notifier,
            options,
            pending: PendingOperations::new(),
            follow_up: FollowUp::None,
            last_intent: None,
            last_settings: None,
        }
    }

    /// The backend.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable access to the backend.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// The notifier outcomes are published on.
    #[must_use]
    pub fn notifier(&self) -> &OutcomeNotifier {
        &self.notifier
    }

    /// The reserved session name.
    #[must_use]
    pub fn session_name(&self) -> &SessionName {
        &self.options.session_name
    }

    /// `true` when the backend has no online subsystem.
    #[must_use]
    pub fn is_lan(&self) -> bool {
        !self.gateway.is_online()
    }

    /// `true` while a call of `kind` is outstanding.
    #[must_use]
    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.pending.is_pending(kind)
    }

    /// `true` while a create waits for the outstanding destroy.
    #[must_use]
    pub fn recreate_pending(&self) -> bool {
        self.follow_up.is_recreate()
    }

    /// Most recent intent that was issued or deferred.
    #[must_use]
    pub fn last_intent(&self) -> Option<&SessionIntent> {
        self.last_intent.as_ref()
    }

    /// Settings of the most recent create call the backend accepted.
    #[must_use]
    pub fn last_settings(&self) -> Option<&SessionSettings> {
        self.last_settings.as_ref()
    }

    /// Current state for status reporting.
    #[must_use]
    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            session_name: self.options.session_name.clone(),
            local_player: self.options.local_player,
            lan: self.is_lan(),
            pending: self.pending.kinds(),
            recreate_pending: self.recreate_pending(),
            session: self.gateway.named_session(&self.options.session_name),
            intent: self.last_intent.clone(),
        }
    }

    /// Hosts a session for `intent`.
    ///
    /// An existing session under the reserved name is destroyed first and
    /// the create is replayed once the destroy succeeds. A second call
    /// while that destroy is outstanding replaces the queued intent.
    pub fn create_session(&mut self, intent: SessionIntent) {
        if let FollowUp::RecreateWith(deferred) = &mut self.follow_up {
            tracing::info!(
                session = %self.options.session_name,
                match_type = intent.match_type(),
                "replacing deferred create"
            );
            *deferred = intent.clone();
            self.last_intent = Some(intent);
            return;
        }

        if self.pending.is_pending(OperationKind::Create) {
            tracing::warn!(session = %self.options.session_name, "create already in flight");
            self.notifier
                .publish(SessionOutcome::failure(OperationKind::Create));
            return;
        }

        if self
            .gateway
            .named_session(&self.options.session_name)
            .is_some()
        {
            if self.pending.is_pending(OperationKind::Destroy) {
                tracing::warn!(
                    session = %self.options.session_name,
                    "destroy already in flight, cannot recreate"
                );
                self.notifier
                    .publish(SessionOutcome::failure(OperationKind::Create));
                return;
            }
            tracing::info!(
                session = %self.options.session_name,
                "session exists, destroying before create"
            );
            self.follow_up = FollowUp::RecreateWith(intent.clone());
            self.last_intent = Some(intent);
            self.destroy_session();
            return;
        }

        self.issue_create(intent);
    }

    /// Searches for sessions. Ignored while a search is in flight.
    pub fn find_sessions(&mut self, max_results: u32) {
        if self.pending.is_pending(OperationKind::Find) {
            tracing::debug!("search already in progress, ignoring");
            return;
        }

        let search = match SessionSearch::presence(max_results, self.is_lan()) {
            Ok(search) => search,
            Err(err) => {
                tracing::warn!(%err, "refusing search");
                self.report_failure(OperationKind::Find);
                return;
            }
        };

        self.begin(OperationKind::Find);
        if self
            .gateway
            .find_sessions(self.options.local_player, &search)
        {
            tracing::info!(max_results, lan = search.is_lan_query, "search issued");
            return;
        }
        tracing::warn!("backend rejected search");
        self.release(OperationKind::Find);
        self.report_failure(OperationKind::Find);
    }

    /// Joins the session behind `result` under the reserved name.
    pub fn join_session(&mut self, result: &SessionSearchResult) {
        if self.pending.is_pending(OperationKind::Join) {
            tracing::warn!(session = %self.options.session_name, "join already in flight");
            self.notifier
                .publish(SessionOutcome::failure(OperationKind::Join));
            return;
        }

        self.begin(OperationKind::Join);
        if self.gateway.join_session(
            self.options.local_player,
            &self.options.session_name,
            result,
        ) {
            tracing::info!(
                session = %self.options.session_name,
                session_id = %result.session_id,
                "join issued"
            );
            return;
        }
        tracing::warn!(session_id = %result.session_id, "backend rejected join");
        self.release(OperationKind::Join);
        self.report_failure(OperationKind::Join);
    }

    /// Starts the reserved session.
    pub fn start_session(&mut self) {
        if self.pending.is_pending(OperationKind::Start) {
            tracing::warn!(session = %self.options.session_name, "start already in flight");
            self.notifier
                .publish(SessionOutcome::failure(OperationKind::Start));
            return;
        }

        self.begin(OperationKind::Start);
        if self.gateway.start_session(&self.options.session_name) {
            tracing::info!(session = %self.options.session_name, "start issued");
            return;
        }
        tracing::warn!(session = %self.options.session_name, "backend rejected start");
        self.release(OperationKind::Start);
        self.report_failure(OperationKind::Start);
    }

    /// Destroys the reserved session.
    pub fn destroy_session(&mut self) {
        if self.pending.is_pending(OperationKind::Destroy) {
            tracing::warn!(session = %self.options.session_name, "destroy already in flight");
            self.notifier
                .publish(SessionOutcome::failure(OperationKind::Destroy));
            return;
        }

        self.begin(OperationKind::Destroy);
        if self.gateway.destroy_session(&self.options.session_name) {
            tracing::info!(
                session = %self.options.session_name,
                recreate = self.follow_up.is_recreate(),
                "destroy issued"
            );
            return;
        }
        tracing::warn!(session = %self.options.session_name, "backend rejected destroy");
        self.release(OperationKind::Destroy);
        self.report_failure(OperationKind::Destroy);
    }

    /// Pulls completions from the backend and handles each one.
    ///
    /// Returns the number of completions the backend delivered.
    pub fn poll_gateway(&mut self) -> usize {
        let completions = self.gateway.poll_completions();
        let delivered = completions.len();
        for completion in completions {
            self.handle_completion(completion);
        }
        delivered
    }

    /// Handles one completion signal.
    ///
    /// Completions for another session name, or for a kind with no
    /// outstanding call, are ignored.
    pub fn handle_completion(&mut self, completion: GatewayCompletion) {
        let kind = completion.kind();
        if let Some(name) = completion.session_name()
            && *name != self.options.session_name
        {
            tracing::debug!(session = %name, operation = %kind, "ignoring completion for other session");
            return;
        }
        if !self.release(kind) {
            tracing::debug!(operation = %kind, "ignoring completion without listener");
            return;
        }

        match completion {
            GatewayCompletion::Create { success, .. } => {
                tracing::info!(session = %self.options.session_name, success, "create completed");
                self.notifier.publish(SessionOutcome::Created { success });
            }
            GatewayCompletion::Find { success, results } => {
                tracing::info!(found = results.len(), success, "search completed");
                self.notifier
                    .publish(SessionOutcome::SessionsFound { results, success });
            }
            GatewayCompletion::Join {
                session_name,
                result,
            } => {
                let address = self
                    .gateway
                    .resolved_connect_string(&session_name)
                    .unwrap_or_default();
                let result = if address.is_empty() {
                    if result.is_success() {
                        tracing::warn!(session = %session_name, "joined but no connect address resolved");
                    }
                    JoinResult::UnknownError
                } else {
                    result
                };
                tracing::info!(session = %session_name, %result, "join completed");
                self.notifier
                    .publish(SessionOutcome::Joined { result, address });
            }
            GatewayCompletion::Start { success, .. } => {
                tracing::info!(session = %self.options.session_name, success, "start completed");
                self.notifier.publish(SessionOutcome::Started { success });
            }
            GatewayCompletion::Destroy { success, .. } => self.finish_destroy(success),
        }
    }

    /// Fails every call outstanding for longer than the configured timeout.
    ///
    /// Returns the number of calls that expired; always zero without a
    /// timeout.
    pub fn expire_stale(&mut self, now: Instant) -> usize {
        let Some(timeout) = self.options.operation_timeout else {
            return 0;
        };
        let expired = self.pending.expired(now, timeout);
        for kind in &expired {
            tracing::warn!(
                operation = %kind,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "operation timed out"
            );
            self.release(*kind);
            self.report_failure(*kind);
        }
        expired.len()
    }

    fn issue_create(&mut self, intent: SessionIntent) {
        let settings = SessionSettings::for_intent(
            &intent,
            self.is_lan(),
            self.options.build_unique_id,
        );

        self.begin(OperationKind::Create);
        if self.gateway.create_session(
            self.options.local_player,
            &self.options.session_name,
            &settings,
        ) {
            tracing::info!(
                session = %self.options.session_name,
                slots = intent.max_public_slots(),
                match_type = intent.match_type(),
                lan = settings.is_lan_match,
                "create issued"
            );
            self.last_intent = Some(intent);
            self.last_settings = Some(settings);
            return;
        }
        tracing::warn!(session = %self.options.session_name, "backend rejected create");
        self.release(OperationKind::Create);
        self.report_failure(OperationKind::Create);
    }

    fn finish_destroy(&mut self, success: bool) {
        let follow_up = self.follow_up.take();
        tracing::info!(session = %self.options.session_name, success, "destroy completed");
        self.notifier.publish(SessionOutcome::Destroyed { success });

        match follow_up {
            FollowUp::RecreateWith(intent) if success => {
                tracing::info!(
                    session = %self.options.session_name,
                    match_type = intent.match_type(),
                    "recreating session"
                );
                self.issue_create(intent);
            }
            FollowUp::RecreateWith(_) => {
                tracing::warn!(session = %self.options.session_name, "destroy failed, dropping deferred create");
                self.notifier
                    .publish(SessionOutcome::failure(OperationKind::Create));
            }
            FollowUp::None => {}
        }
    }

    fn begin(&mut self, kind: OperationKind) {
        let listener = self.gateway.add_completion_listener(kind);
        if self.pending.begin(kind, listener, Instant::now()).is_some() {
            tracing::error!(operation = %kind, "pending slot overwritten");
        }
    }

    /// Empties the slot for `kind` and clears its listener. Returns
    /// `false` if nothing was outstanding.
    fn release(&mut self, kind: OperationKind) -> bool {
        let Some(call) = self.pending.release(kind) else {
            return false;
        };
        if !self.gateway.clear_completion_listener(call.listener) {
            tracing::warn!(operation = %kind, listener = %call.listener, "listener was already cleared");
        }
        true
    }

    /// Publishes the failure outcome for `kind`. A failed destroy also
    /// fails the create queued behind it.
    fn report_failure(&mut self, kind: OperationKind) {
        self.notifier.publish(SessionOutcome::failure(kind));
        if kind == OperationKind::Destroy && self.follow_up.take().is_recreate() {
            tracing::warn!(session = %self.options.session_name, "dropping deferred create");
            self.notifier
                .publish(SessionOutcome::failure(OperationKind::Create));
        }
    }
}
