//! Search handlers: find sessions, list results, join one.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AcceptedResponse, FindSessionsRequest, SearchResultsResponse};
use crate::app_state::AppState;
use crate::domain::OperationKind;
use crate::error::{ErrorResponse, SessionError};

/// `POST /searches`: Search for sessions.
///
/// Ignored by the coordinator while a search is already running.
///
/// # Errors
///
/// Returns [`SessionError`] for a zero result cap or a stopped driver.
#[utoipa::path(
    post,
    path = "/api/v1/searches",
    tag = "Searches",
    summary = "Find sessions",
    description = "Starts a presence search. The `sessions_found` outcome is published on the WebSocket stream.",
    request_body = FindSessionsRequest,
    responses(
        (status = 202, description = "Search issued", body = AcceptedResponse),
        (status = 400, description = "Invalid result cap", body = ErrorResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn find_sessions(
    State(state): State<AppState>,
    Json(req): Json<FindSessionsRequest>,
) -> Result<impl IntoResponse, SessionError> {
    let max_results = req.max_results.unwrap_or(state.menu.max_search_results);
    if max_results == 0 {
        return Err(SessionError::InvalidRequest(
            "max_results must be greater than zero".to_string(),
        ));
    }
    state.driver.find_sessions(max_results).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::new(OperationKind::Find)),
    ))
}

/// `GET /searches/results`: Results of the most recent search.
///
/// # Errors
///
/// Returns [`SessionError::DriverUnavailable`] if the driver stopped.
#[utoipa::path(
    get,
    path = "/api/v1/searches/results",
    tag = "Searches",
    summary = "Last search results",
    responses(
        (status = 200, description = "Results in search order", body = SearchResultsResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn search_results(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, SessionError> {
    let results = state.driver.search_results().await?;
    Ok(Json(SearchResultsResponse::from_results(&results)))
}

/// `POST /searches/results/{index}/join`: Join an entry of the last search.
///
/// # Errors
///
/// Returns [`SessionError::SearchResultNotFound`] for an unknown index.
#[utoipa::path(
    post,
    path = "/api/v1/searches/results/{index}/join",
    tag = "Searches",
    summary = "Join a search result",
    description = "Joins the entry at `index`. The `joined` outcome carries the connect address.",
    params(
        ("index" = usize, Path, description = "Position in the last search results"),
    ),
    responses(
        (status = 202, description = "Join issued", body = AcceptedResponse),
        (status = 404, description = "No such result", body = ErrorResponse),
        (status = 503, description = "Driver stopped", body = ErrorResponse),
    )
)]
pub async fn join_result(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, SessionError> {
    state.driver.join_result(index).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::new(OperationKind::Join)),
    ))
}

/// Search routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/searches", post(find_sessions))
        .route("/searches/results", get(search_results))
        .route("/searches/results/{index}/join", post(join_result))
}
