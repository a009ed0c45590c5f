//! Route definitions for the HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState`
//! and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/drawing", post(handlers::drawing::dispatch_edit))
        .route("/health", get(handlers::health::health));

    Router::new().nest("/api", api_routes).with_state(state)
}
