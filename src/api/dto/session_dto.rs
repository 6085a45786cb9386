//! Session DTOs: create request and status snapshot.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SessionIntent;
use crate::driver::DriverStatus;
use crate::error::SessionError;
use crate::gateway::{NamedSession, NamedSessionState};
use crate::service::TravelDirective;

/// Request body for `POST /sessions`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Public connection slots (must be positive).
    pub max_public_slots: u32,
    /// Match type advertised for discovery.
    pub match_type: String,
}

impl CreateSessionRequest {
    /// Validates the request into an intent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] for zero slots or a blank match type.
    pub fn into_intent(self) -> Result<SessionIntent, SessionError> {
        SessionIntent::new(self.max_public_slots, self.match_type)
    }
}

/// Named session as reported by the backend.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NamedSessionDto {
    /// Backend session id.
    pub session_id: uuid::Uuid,
    /// Whether the local player hosts it.
    pub is_host: bool,
    /// `pending` or `in_progress`.
    pub state: String,
}

impl From<NamedSession> for NamedSessionDto {
    fn from(session: NamedSession) -> Self {
        let state = match session.state {
            NamedSessionState::Pending => "pending",
            NamedSessionState::InProgress => "in_progress",
        };
        Self {
            session_id: session.session_id,
            is_host: session.is_host,
            state: state.to_string(),
        }
    }
}

/// Hosting parameters.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IntentDto {
    /// Public connection slots.
    pub max_public_slots: u32,
    /// Match type.
    pub match_type: String,
}

/// Travel requested after a create or join.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TravelDto {
    /// `server_travel` or `client_travel`.
    pub travel: String,
    /// Listen URL or host address.
    pub target: String,
}

impl From<TravelDirective> for TravelDto {
    fn from(directive: TravelDirective) -> Self {
        match directive {
            TravelDirective::ServerTravel { url } => Self {
                travel: "server_travel".to_string(),
                target: url,
            },
            TravelDirective::ClientTravel { address } => Self {
                travel: "client_travel".to_string(),
                target: address,
            },
        }
    }
}

/// Response body for `GET /sessions/status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionStatusResponse {
    /// Reserved session name.
    pub session_name: String,
    /// Local player id.
    pub local_player: uuid::Uuid,
    /// Whether calls go out in LAN mode.
    pub lan: bool,
    /// Operations with an outstanding backend call.
    pub pending: Vec<String>,
    /// Whether a create waits on the outstanding destroy.
    pub recreate_pending: bool,
    /// The session the backend holds, if any.
    pub session: Option<NamedSessionDto>,
    /// Most recent hosting intent.
    pub intent: Option<IntentDto>,
    /// Menu host action enabled.
    pub host_enabled: bool,
    /// Menu join action enabled.
    pub join_enabled: bool,
    /// Most recent travel directive.
    pub last_travel: Option<TravelDto>,
    /// Entries in the most recent search.
    pub search_results: usize,
}

impl From<DriverStatus> for SessionStatusResponse {
    fn from(status: DriverStatus) -> Self {
        let coordinator = status.coordinator;
        Self {
            session_name: coordinator.session_name.to_string(),
            local_player: *coordinator.local_player.as_uuid(),
            lan: coordinator.lan,
            pending: coordinator
                .pending
                .iter()
                .map(|kind| kind.as_str().to_string())
                .collect(),
            recreate_pending: coordinator.recreate_pending,
            session: coordinator.session.map(NamedSessionDto::from),
            intent: coordinator.intent.map(|intent| IntentDto {
                max_public_slots: intent.max_public_slots(),
                match_type: intent.match_type().to_string(),
            }),
            host_enabled: status.host_enabled,
            join_enabled: status.join_enabled,
            last_travel: status.last_travel.map(TravelDto::from),
            search_results: status.search_results,
        }
    }
}
