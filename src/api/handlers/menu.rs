//! Menu handlers: the host and join buttons.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::MenuActionResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, SessionError};

/// `POST /menu/host`: Host with the configured menu parameters.
///
/// # Errors
///
/// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
#[utoipa::path(
    post,
    path = "/api/v1/menu/host",
    tag = "Menu",
    summary = "Press host",
    description = "Creates a session with the menu's slot count and match type. Disabled until that create fails.",
    responses(
        (status = 202, description = "Action handled", body = MenuActionResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn menu_host(State(state): State<AppState>) -> Result<impl IntoResponse, SessionError> {
    let accepted = state.driver.menu_host().await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MenuActionResponse {
            action: "host".to_string(),
            accepted,
        }),
    ))
}

/// `POST /menu/join`: Search and join the first matching session.
///
/// # Errors
///
/// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
#[utoipa::path(
    post,
    path = "/api/v1/menu/join",
    tag = "Menu",
    summary = "Press join",
    description = "Searches for sessions and joins the first one advertising the menu's match type. Disabled until the search or join fails.",
    responses(
        (status = 202, description = "Action handled", body = MenuActionResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn menu_join(State(state): State<AppState>) -> Result<impl IntoResponse, SessionError> {
    let accepted = state.driver.menu_join().await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MenuActionResponse {
            action: "join".to_string(),
            accepted,
        }),
    ))
}

/// Menu routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu/host", post(menu_host))
        .route("/menu/join", post(menu_join))
}
