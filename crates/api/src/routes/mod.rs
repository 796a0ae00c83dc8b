//! HTTP route handlers for the public API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check
//!
//! # Locator
//! GET  /search                  - Club search by region, point, or address
//! GET  /redirect                - Redirect to the nearest club's page
//! GET  /clubs/{club_id}         - Single club record
//!
//! # Rewards
//! GET  /rewards/{user_id}       - Account snapshot (club_id query param)
//! POST /rewards/{user_id}/earn  - Qualifying purchase event
//! POST /rewards/{user_id}/bonus - Administrative credit
//! POST /rewards/{user_id}/redeem - Points redemption
//! POST /rewards/redeem-token    - Free-drink milestone redemption
//! ```

pub mod rewards;
pub mod search;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::rate_limit::{rewards_rate_limit, search_rate_limit};
use crate::state::AppState;

/// Create the locator routes router.
pub fn search_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/search", get(search::search))
        .route("/redirect", get(search::redirect_nearest))
        .route("/clubs/{club_id}", get(search::club_detail))
        .layer(from_fn_with_state(state.clone(), search_rate_limit))
}

/// Create the rewards routes router.
pub fn rewards_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/rewards/{user_id}", get(rewards::get_account))
        .route("/rewards/{user_id}/earn", post(rewards::earn))
        .route("/rewards/{user_id}/bonus", post(rewards::bonus))
        .route("/rewards/{user_id}/redeem", post(rewards::redeem_points))
        .route("/rewards/redeem-token", post(rewards::redeem_token))
        .layer(from_fn_with_state(state.clone(), rewards_rate_limit))
}

/// Create all public routes.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(search_routes(state))
        .merge(rewards_routes(state))
}
