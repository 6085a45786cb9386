//! System endpoints: health check and menu configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Menu configuration.
#[derive(Debug, Serialize, ToSchema)]
pub struct MenuConfigResponse {
    num_public_connections: u32,
    match_type: String,
    lobby_path: String,
    listen_url: String,
    max_search_results: u32,
}

/// `GET /config/menu`: Hosting and search parameters of the menu.
#[utoipa::path(
    get,
    path = "/config/menu",
    tag = "System",
    summary = "Menu configuration",
    responses(
        (status = 200, description = "Menu parameters", body = MenuConfigResponse),
    )
)]
pub async fn menu_config_handler(State(state): State<AppState>) -> impl IntoResponse {
    let menu = &state.menu;
    (
        StatusCode::OK,
        Json(MenuConfigResponse {
            num_public_connections: menu.num_public_connections,
            match_type: menu.match_type.clone(),
            lobby_path: menu.lobby_path.clone(),
            listen_url: menu.listen_url(),
            max_search_results: menu.max_search_results,
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/menu", get(menu_config_handler))
}
