//! Headless host/join menu flow.
//!
//! Holds what the menu screen would: its configured hosting parameters and
//! whether the host and join actions are currently enabled. Outcomes are
//! fed in by the driver; a successful create or join yields a
//! [`TravelDirective`] for whoever performs level travel.

use serde::Serialize;

use crate::domain::{OperationKind, SessionIntent, SessionOutcome};
use crate::error::SessionError;
use crate::gateway::SessionGateway;

use super::coordinator::SessionCoordinator;
use super::matchmaking::try_join_session;

/// Default public connection count for hosted sessions.
pub const DEFAULT_PUBLIC_CONNECTIONS: u32 = 2;
/// Default match type.
pub const DEFAULT_MATCH_TYPE: &str = "FreeForAll";
/// Default lobby map.
pub const DEFAULT_LOBBY_PATH: &str = "/Game/Maps/Lobby";
/// Default search cap.
pub const DEFAULT_MAX_SEARCH_RESULTS: u32 = 100_000;

/// Menu configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSettings {
    /// Public slots requested when hosting.
    pub num_public_connections: u32,
    /// Match type hosted and searched for.
    pub match_type: String,
    /// Map the host travels to after creating.
    pub lobby_path: String,
    /// Search cap used when joining.
    pub max_search_results: u32,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            num_public_connections: DEFAULT_PUBLIC_CONNECTIONS,
            match_type: DEFAULT_MATCH_TYPE.to_string(),
            lobby_path: DEFAULT_LOBBY_PATH.to_string(),
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
        }
    }
}

impl MenuSettings {
    /// Lobby path with `?listen` appended.
    #[must_use]
    pub fn listen_url(&self) -> String {
        format!("{}?listen", self.lobby_path)
    }
}

/// Where to travel after a successful create or join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "travel", rename_all = "snake_case")]
pub enum TravelDirective {
    /// Host: open the lobby as a listen server.
    ServerTravel {
        /// Listen URL.
        url: String,
    },
    /// Client: connect to the host.
    ClientTravel {
        /// Resolved connect address.
        address: String,
    },
}

/// Host/join flow with button enablement.
#[derive(Debug, Clone)]
pub struct MenuFlow {
    settings: MenuSettings,
    intent: SessionIntent,
    host_enabled: bool,
    join_enabled: bool,
    awaiting_search: bool,
}

impl MenuFlow {
    /// Builds the flow, validating the hosting parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the connection count is zero, the match
    /// type is blank or the search cap is zero.
    pub fn new(settings: MenuSettings) -> Result<Self, SessionError> {
        if settings.max_search_results == 0 {
            return Err(SessionError::InvalidRequest(
                "max_search_results must be greater than zero".to_string(),
            ));
        }
        let intent = SessionIntent::new(
            settings.num_public_connections,
            settings.match_type.clone(),
        )?;
        Ok(Self {
            settings,
            intent,
            host_enabled: true,
            join_enabled: true,
            awaiting_search: false,
        })
    }

    /// Whether the host action is available.
    #[must_use]
    pub const fn host_enabled(&self) -> bool {
        self.host_enabled
    }

    /// Whether the join action is available.
    #[must_use]
    pub const fn join_enabled(&self) -> bool {
        self.join_enabled
    }

    /// Hosts a session with the configured parameters. Returns `false`
    /// when hosting is disabled.
    pub fn host<G: SessionGateway>(&mut self, coordinator: &mut SessionCoordinator<G>) -> bool {
        if !self.host_enabled {
            tracing::debug!("host disabled, ignoring");
            return false;
        }
        self.host_enabled = false;
        coordinator.create_session(self.intent.clone());
        true
    }

    /// Searches for a session to join. Returns `false` when joining is
    /// disabled or a search is already in flight; the menu never adopts a
    /// search it did not start.
    pub fn join<G: SessionGateway>(&mut self, coordinator: &mut SessionCoordinator<G>) -> bool {
        if !self.join_enabled {
            tracing::debug!("join disabled, ignoring");
            return false;
        }
        if coordinator.is_pending(OperationKind::Find) {
            tracing::debug!("search already in flight, ignoring join");
            return false;
        }
        self.join_enabled = false;
        self.awaiting_search = true;
        coordinator.find_sessions(self.settings.max_search_results);
        true
    }

    /// Reacts to an outcome.
    ///
    /// Search results are only acted on while a search started by
    /// [`Self::join`] is outstanding.
    pub fn on_outcome<G: SessionGateway>(
        &mut self,
        outcome: &SessionOutcome,
        coordinator: &mut SessionCoordinator<G>,
    ) -> Option<TravelDirective> {
        match outcome {
            SessionOutcome::Created { success: true } => {
                let url = self.settings.listen_url();
                tracing::info!(%url, "session created, travelling to lobby");
                Some(TravelDirective::ServerTravel { url })
            }
            SessionOutcome::Created { success: false } => {
                tracing::error!("failed to create session");
                self.host_enabled = true;
                None
            }
            SessionOutcome::SessionsFound { results, success } => {
                if !self.awaiting_search {
                    return None;
                }
                self.awaiting_search = false;
                if !try_join_session(coordinator, results, *success, &self.settings.match_type) {
                    self.join_enabled = true;
                }
                None
            }
            SessionOutcome::Joined { result, address } => {
                if result.is_success() {
                    tracing::info!(%address, "joined session, travelling to host");
                    return Some(TravelDirective::ClientTravel {
                        address: address.clone(),
                    });
                }
                tracing::error!(%result, "failed to join session");
                self.join_enabled = true;
                None
            }
            SessionOutcome::Started { success } => {
                tracing::info!(success, "session start finished");
                None
            }
            SessionOutcome::Destroyed { success } => {
                tracing::info!(success, "session destroy finished");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{
        JoinResult, LocalPlayerId, MATCH_TYPE_KEY, OperationKind, OutcomeNotifier, SessionName,
        SessionSearchResult,
    };
    use crate::gateway::GatewayCompletion;
    use crate::gateway::recording::{GatewayCall, RecordingGateway};
    use crate::service::CoordinatorOptions;

    fn menu() -> MenuFlow {
        let Ok(menu) = MenuFlow::new(MenuSettings::default()) else {
            panic!("default settings are valid");
        };
        menu
    }

    fn coordinator() -> SessionCoordinator<RecordingGateway> {
        SessionCoordinator::new(
            RecordingGateway::new(),
            OutcomeNotifier::new(16),
            CoordinatorOptions::default(),
        )
    }

    fn result(match_type: &str) -> SessionSearchResult {
        SessionSearchResult {
            session_id: uuid::Uuid::new_v4(),
            owner: LocalPlayerId::new(),
            build_unique_id: 1,
            open_public_slots: 1,
            max_public_slots: 2,
            ping_ms: 8,
            attributes: BTreeMap::from([(MATCH_TYPE_KEY.to_string(), match_type.to_string())]),
        }
    }

    #[test]
    fn defaults() {
        let settings = MenuSettings::default();
        assert_eq!(settings.num_public_connections, 2);
        assert_eq!(settings.match_type, "FreeForAll");
        assert_eq!(settings.listen_url(), "/Game/Maps/Lobby?listen");
        assert_eq!(settings.max_search_results, 100_000);
    }

    #[test]
    fn invalid_settings_rejected() {
        let zero_slots = MenuSettings {
            num_public_connections: 0,
            ..MenuSettings::default()
        };
        assert!(MenuFlow::new(zero_slots).is_err());

        let no_cap = MenuSettings {
            max_search_results: 0,
            ..MenuSettings::default()
        };
        assert!(MenuFlow::new(no_cap).is_err());
    }

    #[test]
    fn host_creates_and_travels() {
        let mut menu = menu();
        let mut coordinator = coordinator();

        assert!(menu.host(&mut coordinator));
        assert!(!menu.host_enabled());
        assert!(!menu.host(&mut coordinator));

        let Some(GatewayCall::Create { settings, .. }) = coordinator.gateway().calls.first()
        else {
            panic!("create call recorded");
        };
        assert_eq!(settings.num_public_connections, 2);
        assert_eq!(settings.match_type(), Some("FreeForAll"));

        let travel = menu.on_outcome(&SessionOutcome::Created { success: true }, &mut coordinator);
        assert_eq!(
            travel,
            Some(TravelDirective::ServerTravel {
                url: "/Game/Maps/Lobby?listen".to_string()
            })
        );
    }

    #[test]
    fn failed_create_reenables_host() {
        let mut menu = menu();
        let mut coordinator = coordinator();

        menu.host(&mut coordinator);
        assert!(
            menu.on_outcome(&SessionOutcome::Created { success: false }, &mut coordinator)
                .is_none()
        );
        assert!(menu.host_enabled());
    }

    #[test]
    fn join_searches_then_joins_match() {
        let mut menu = menu();
        let mut coordinator = coordinator();

        assert!(menu.join(&mut coordinator));
        assert!(!menu.join_enabled());
        assert_eq!(coordinator.gateway().calls_of(OperationKind::Find), 1);

        coordinator.gateway_mut().complete(GatewayCompletion::Find {
            success: true,
            results: Vec::new(),
        });
        coordinator.poll_gateway();

        let found = SessionOutcome::SessionsFound {
            results: vec![result("Ranked"), result("FreeForAll")],
            success: true,
        };
        assert!(menu.on_outcome(&found, &mut coordinator).is_none());
        assert_eq!(coordinator.gateway().calls_of(OperationKind::Join), 1);
        assert!(!menu.join_enabled());

        let joined = SessionOutcome::Joined {
            result: JoinResult::Success,
            address: "10.1.1.4:7777".to_string(),
        };
        assert_eq!(
            menu.on_outcome(&joined, &mut coordinator),
            Some(TravelDirective::ClientTravel {
                address: "10.1.1.4:7777".to_string()
            })
        );
    }

    #[test]
    fn nothing_found_reenables_join() {
        let mut menu = menu();
        let mut coordinator = coordinator();

        menu.join(&mut coordinator);
        let found = SessionOutcome::SessionsFound {
            results: vec![result("Ranked")],
            success: true,
        };
        menu.on_outcome(&found, &mut coordinator);

        assert!(menu.join_enabled());
        assert_eq!(coordinator.gateway().calls_of(OperationKind::Join), 0);
    }

    #[test]
    fn failed_join_reenables_join() {
        let mut menu = menu();
        let mut coordinator = coordinator();

        menu.join(&mut coordinator);
        let joined = SessionOutcome::Joined {
            result: JoinResult::SessionIsFull,
            address: String::new(),
        };
        assert!(menu.on_outcome(&joined, &mut coordinator).is_none());
        assert!(menu.join_enabled());
    }

    #[test]
    fn search_results_without_menu_search_are_ignored() {
        let mut menu = menu();
        let mut coordinator = coordinator();

        let found = SessionOutcome::SessionsFound {
            results: vec![result("FreeForAll")],
            success: true,
        };
        menu.on_outcome(&found, &mut coordinator);

        assert!(coordinator.gateway().calls.is_empty());
        assert_eq!(coordinator.session_name(), &SessionName::game());
    }

    #[test]
    fn join_leaves_a_foreign_search_alone() {
        let mut menu = menu();
        let mut coordinator = coordinator();

        coordinator.find_sessions(10);
        assert!(!menu.join(&mut coordinator));
        assert!(menu.join_enabled());
        assert_eq!(coordinator.gateway().calls_of(OperationKind::Find), 1);

        let found = SessionOutcome::SessionsFound {
            results: vec![result("FreeForAll")],
            success: true,
        };
        assert!(menu.on_outcome(&found, &mut coordinator).is_none());
        assert_eq!(coordinator.gateway().calls_of(OperationKind::Join), 0);
    }
}
