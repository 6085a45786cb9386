//! Session handlers: create, destroy, start, status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AcceptedResponse, CreateSessionRequest, SessionStatusResponse};
use crate::app_state::AppState;
use crate::domain::OperationKind;
use crate::error::{ErrorResponse, SessionError};

/// `POST /sessions`: Host a session.
///
/// An existing session under the reserved name is destroyed first and the
/// new one is created once that destroy succeeds.
///
/// # Errors
///
/// Returns [`SessionError`] for zero slots, a blank match type, or a
/// stopped driver.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "Create a session",
    description = "Hosts a session with the given slot count and match type. The `created` outcome is published on the WebSocket stream.",
    request_body = CreateSessionRequest,
    responses(
        (status = 202, description = "Create issued", body = AcceptedResponse),
        (status = 400, description = "Invalid slots or match type", body = ErrorResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, SessionError> {
    let intent = req.into_intent()?;
    state.driver.create_session(intent).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::new(OperationKind::Create)),
    ))
}

/// `DELETE /sessions`: Destroy the session.
///
/// # Errors
///
/// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "Destroy the session",
    responses(
        (status = 202, description = "Destroy issued", body = AcceptedResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn destroy_session(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, SessionError> {
    state.driver.destroy_session().await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::new(OperationKind::Destroy)),
    ))
}

/// `POST /sessions/start`: Start the session.
///
/// # Errors
///
/// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/start",
    tag = "Sessions",
    summary = "Start the session",
    responses(
        (status = 202, description = "Start issued", body = AcceptedResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, SessionError> {
    state.driver.start_session().await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::new(OperationKind::Start)),
    ))
}

/// `GET /sessions/status`: Coordinator and menu state.
///
/// # Errors
///
/// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/status",
    tag = "Sessions",
    summary = "Session status",
    description = "Pending operations, the backend's named session, the last intent and the menu state.",
    responses(
        (status = 200, description = "Current status", body = SessionStatusResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn session_status(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, SessionError> {
    let status = state.driver.status().await?;
    Ok(Json(SessionStatusResponse::from(status)))
}

/// Session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session).delete(destroy_session))
        .route("/sessions/start", post(start_session))
        .route("/sessions/status", get(session_status))
}
