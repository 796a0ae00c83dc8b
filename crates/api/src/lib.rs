//! SipClub API library.
//!
//! This crate provides the public HTTP service as a library, allowing it
//! to be tested end to end without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router over prepared state.
///
/// Used by `main` and by integration tests; tests skip the Sentry layers
/// that `main` adds on the outside.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(&state))
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// The directory and ledger are in-process, so readiness equals
/// liveness; the endpoint exists so deploys can probe a stable path.
async fn readiness() -> &'static str {
    "ok"
}
