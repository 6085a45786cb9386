//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws`: Upgrade HTTP connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    // Nothing is forwarded until the client subscribes.
    let outcomes = state.notifier.subscribe_to(&[]);
    let driver = state.driver.clone();

    ws.on_upgrade(move |socket| run_connection(socket, outcomes, driver))
}
