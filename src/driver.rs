//! The control thread.
//!
//! A [`SessionDriver`] runs as one tokio task that owns the
//! [`SessionCoordinator`] and the [`MenuFlow`]. Everything that touches the
//! coordinator happens on that task: commands sent through a
//! [`DriverHandle`], gateway completions pumped on a fixed tick, and the
//! menu's reactions to outcomes. No lock guards coordinator state.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

use crate::domain::{OutcomeSubscription, SessionIntent, SessionOutcome, SessionSearchResult};
use crate::error::SessionError;
use crate::gateway::SessionGateway;
use crate::service::{CoordinatorStatus, MenuFlow, SessionCoordinator, TravelDirective};

/// Command queue depth.
const CHANNEL_CAPACITY: usize = 64;

/// Default interval between gateway polls.
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Requests handled on the control thread.
#[derive(Debug)]
pub enum DriverCommand {
    /// Host a session.
    CreateSession {
        /// Hosting parameters.
        intent: SessionIntent,
        /// Acknowledged once issued.
        reply: oneshot::Sender<()>,
    },
    /// Search for sessions.
    FindSessions {
        /// Search cap.
        max_results: u32,
        /// Acknowledged once issued.
        reply: oneshot::Sender<()>,
    },
    /// Join an entry of the last search.
    JoinResult {
        /// Position in the last search results.
        index: usize,
        /// Fails if there is no such entry.
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    /// Start the session.
    StartSession {
        /// Acknowledged once issued.
        reply: oneshot::Sender<()>,
    },
    /// Destroy the session.
    DestroySession {
        /// Acknowledged once issued.
        reply: oneshot::Sender<()>,
    },
    /// Press the menu's host action.
    MenuHost {
        /// Whether the action was enabled.
        reply: oneshot::Sender<bool>,
    },
    /// Press the menu's join action.
    MenuJoin {
        /// Whether the action was enabled.
        reply: oneshot::Sender<bool>,
    },
    /// Snapshot of driver state.
    Status {
        /// Receives the snapshot.
        reply: oneshot::Sender<DriverStatus>,
    },
    /// Results of the most recent search.
    SearchResults {
        /// Receives the results.
        reply: oneshot::Sender<Vec<SessionSearchResult>>,
    },
}

/// Driver state as reported to the control surface.
#[derive(Debug, Clone, Serialize)]
pub struct DriverStatus {
    /// Coordinator snapshot.
    pub coordinator: CoordinatorStatus,
    /// Whether the menu's host action is enabled.
    pub host_enabled: bool,
    /// Whether the menu's join action is enabled.
    pub join_enabled: bool,
    /// Most recent travel directive.
    pub last_travel: Option<TravelDirective>,
    /// Entries in the most recent search.
    pub search_results: usize,
}

/// Cloneable sender side of the driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    sender: mpsc::Sender<DriverCommand>,
}

impl DriverHandle {
    /// Hosts a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn create_session(&self, intent: SessionIntent) -> Result<(), SessionError> {
        self.request(|reply| DriverCommand::CreateSession { intent, reply })
            .await
    }

    /// Searches for sessions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn find_sessions(&self, max_results: u32) -> Result<(), SessionError> {
        self.request(|reply| DriverCommand::FindSessions { max_results, reply })
            .await
    }

    /// Joins entry `index` of the last search.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SearchResultNotFound`] for an unknown index,
    /// or [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn join_result(&self, index: usize) -> Result<(), SessionError> {
        self.request(|reply| DriverCommand::JoinResult { index, reply })
            .await?
    }

    /// Starts the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn start_session(&self) -> Result<(), SessionError> {
        self.request(|reply| DriverCommand::StartSession { reply })
            .await
    }

    /// Destroys the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn destroy_session(&self) -> Result<(), SessionError> {
        self.request(|reply| DriverCommand::DestroySession { reply })
            .await
    }

    /// Presses the menu's host action. Returns whether it was enabled.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn menu_host(&self) -> Result<bool, SessionError> {
        self.request(|reply| DriverCommand::MenuHost { reply }).await
    }

    /// Presses the menu's join action. Returns whether it was enabled.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn menu_join(&self) -> Result<bool, SessionError> {
        self.request(|reply| DriverCommand::MenuJoin { reply }).await
    }

    /// Current driver state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn status(&self) -> Result<DriverStatus, SessionError> {
        self.request(|reply| DriverCommand::Status { reply }).await
    }

    /// Results of the most recent search.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
    pub async fn search_results(&self) -> Result<Vec<SessionSearchResult>, SessionError> {
        self.request(|reply| DriverCommand::SearchResults { reply })
            .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> DriverCommand,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| SessionError::DriverUnavailable)?;
        response.await.map_err(|_| SessionError::DriverUnavailable)
    }
}

/// Owns the coordinator on the control thread.
#[derive(Debug)]
pub struct SessionDriver<G> {
    coordinator: SessionCoordinator<G>,
    menu: MenuFlow,
    outcomes: OutcomeSubscription,
    commands: mpsc::Receiver<DriverCommand>,
    tick: Duration,
    last_results: Vec<SessionSearchResult>,
    last_travel: Option<TravelDirective>,
}

impl<G: SessionGateway + Send + 'static> SessionDriver<G> {
    /// Spawns the driver task.
    ///
    /// The task stops once every [`DriverHandle`] is dropped.
    pub fn spawn(
        coordinator: SessionCoordinator<G>,
        menu: MenuFlow,
        tick: Duration,
    ) -> (DriverHandle, tokio::task::JoinHandle<()>) {
        let (sender, commands) = mpsc::channel(CHANNEL_CAPACITY);
        let outcomes = coordinator.notifier().subscribe_all();
        let driver = Self {
            coordinator,
            menu,
            outcomes,
            commands,
            tick: tick.max(Duration::from_millis(1)),
            last_results: Vec::new(),
            last_travel: None,
        };
        let task = tokio::spawn(driver.run());
        (DriverHandle { sender }, task)
    }

    async fn run(mut self) {
        tracing::debug!(session = %self.coordinator.session_name(), "session driver started");
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => {
                        self.handle_command(command);
                        self.dispatch_outcomes();
                    }
                    None => {
                        tracing::debug!("all driver handles dropped, stopping");
                        break;
                    }
                },
                _ = ticker.tick() => self.on_tick(Instant::now()),
            }
        }
    }

    fn on_tick(&mut self, now: Instant) {
        self.coordinator.poll_gateway();
        self.coordinator.expire_stale(now.into_std());
        self.dispatch_outcomes();
    }

    /// Feeds published outcomes to the menu until none are left. The menu
    /// may issue operations whose failures are published synchronously.
    fn dispatch_outcomes(&mut self) {
        loop {
            let outcomes = self.outcomes.drain();
            if outcomes.is_empty() {
                return;
            }
            for outcome in outcomes {
                self.observe(&outcome);
            }
        }
    }

    fn observe(&mut self, outcome: &SessionOutcome) {
        if let SessionOutcome::SessionsFound { results, .. } = outcome {
            self.last_results.clone_from(results);
        }
        if let Some(travel) = self.menu.on_outcome(outcome, &mut self.coordinator) {
            tracing::info!(?travel, "travel requested");
            self.last_travel = Some(travel);
        }
    }

    fn handle_command(&mut self, command: DriverCommand) {
        match command {
            DriverCommand::CreateSession { intent, reply } => {
                self.coordinator.create_session(intent);
                let _ = reply.send(());
            }
            DriverCommand::FindSessions { max_results, reply } => {
                self.coordinator.find_sessions(max_results);
                let _ = reply.send(());
            }
            DriverCommand::JoinResult { index, reply } => {
                let result = match self.last_results.get(index).cloned() {
                    Some(target) => {
                        self.coordinator.join_session(&target);
                        Ok(())
                    }
                    None => Err(SessionError::SearchResultNotFound(index)),
                };
                let _ = reply.send(result);
            }
            DriverCommand::StartSession { reply } => {
                self.coordinator.start_session();
                let _ = reply.send(());
            }
            DriverCommand::DestroySession { reply } => {
                self.coordinator.destroy_session();
                let _ = reply.send(());
            }
            DriverCommand::MenuHost { reply } => {
                let accepted = self.menu.host(&mut self.coordinator);
                let _ = reply.send(accepted);
            }
            DriverCommand::MenuJoin { reply } => {
                let accepted = self.menu.join(&mut self.coordinator);
                let _ = reply.send(accepted);
            }
            DriverCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
            DriverCommand::SearchResults { reply } => {
                let _ = reply.send(self.last_results.clone());
            }
        }
    }

    fn status(&self) -> DriverStatus {
        DriverStatus {
            coordinator: self.coordinator.status(),
            host_enabled: self.menu.host_enabled(),
            join_enabled: self.menu.join_enabled(),
            last_travel: self.last_travel.clone(),
            search_results: self.last_results.len(),
        }
    }
}
