//! Route definitions for the bookstore HTTP API.
//!
//! JSON endpoints are mounted under `/api`; stored avatars are served under
//! their configured public prefix.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;
use crate::static_files;

/// Build the Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through every
/// route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let max_body = usize::try_from(state.config.server.max_body_bytes).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .merge(user_routes(max_body))
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(static_files::avatar_routes(&state.config.storage.avatars))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Profile and avatar endpoints
fn user_routes(max_body: usize) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::get_profile))
        .route(
            "/users/avatar",
            post(handlers::avatar::upload_avatar).layer(DefaultBodyLimit::max(max_body)),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
