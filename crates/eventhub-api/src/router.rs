//! Route definitions for the EventHub HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(enrollment_routes())
        .merge(schedule_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Enroll, list own enrollments, cancel
fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/enrollments", post(handlers::enrollment::enroll))
        .route("/enrollments/me", get(handlers::enrollment::my_enrollments))
        .route(
            "/enrollments/schedule/{schedule_id}",
            delete(handlers::enrollment::cancel_for_schedule),
        )
        .route(
            "/enrollments/{enrollment_id}",
            delete(handlers::enrollment::cancel_enrollment),
        )
}

/// Schedule details, roster and seats
fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/schedules/{schedule_id}", get(handlers::schedule::get_schedule))
        .route(
            "/schedules/{schedule_id}/enrollments",
            get(handlers::schedule::list_attendees),
        )
        .route("/schedules/{schedule_id}/seats", get(handlers::schedule::seats))
}

/// Liveness and ledger health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
