//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Session endpoints are mounted under `/api/v1`; system endpoints and the
//! WebSocket stream live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorResponse};
use crate::ws::handler::ws_handler;

/// OpenAPI document of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "multiplayer-sessions",
        description = "Session lifecycle control for multiplayer matchmaking. Operation endpoints return 202; outcomes stream on `/ws`."
    ),
    paths(
        handlers::session::create_session,
        handlers::session::destroy_session,
        handlers::session::start_session,
        handlers::session::session_status,
        handlers::search::find_sessions,
        handlers::search::search_results,
        handlers::search::join_result,
        handlers::menu::menu_host,
        handlers::menu::menu_join,
        handlers::system::health_handler,
        handlers::system::menu_config_handler,
    ),
    components(schemas(
        dto::AcceptedResponse,
        dto::MenuActionResponse,
        dto::CreateSessionRequest,
        dto::SessionStatusResponse,
        dto::NamedSessionDto,
        dto::IntentDto,
        dto::TravelDto,
        dto::FindSessionsRequest,
        dto::SearchResultDto,
        dto::SearchResultsResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Sessions", description = "Create, start, destroy and inspect the session"),
        (name = "Searches", description = "Find sessions and join one"),
        (name = "Menu", description = "Host and join buttons of the menu flow"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, Swagger UI (with the
/// `swagger-ui` feature), tracing and CORS.
pub fn build_app(state: AppState) -> Router {
    let app = Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let app = app.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/sessions",
            "/api/v1/sessions/start",
            "/api/v1/sessions/status",
            "/api/v1/searches",
            "/api/v1/searches/results",
            "/api/v1/searches/results/{index}/join",
            "/api/v1/menu/host",
            "/api/v1/menu/join",
            "/health",
            "/config/menu",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
