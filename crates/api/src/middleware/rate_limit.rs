//! Per-client rate limiting for public endpoints.
//!
//! Every public route passes through [`enforce_rate_limit`] before its
//! handler runs. The client key is the real client IP, read from the
//! proxy header chain (Cloudflare, then the standard forwarding headers,
//! then Fly.io) with the socket peer address as the last resort. Requests
//! over budget get a 429 with a `rate_limited` reason code.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum::http::HeaderMap;

use crate::error::ApiError;
use crate::state::AppState;

/// Which per-window budget applies to a route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitCategory {
    /// Location search and redirect endpoints.
    Search,
    /// Rewards read/mutate endpoints.
    Rewards,
}

impl RateLimitCategory {
    fn limit(self, state: &AppState) -> u32 {
        let settings = &state.config().rate_limit;
        match self {
            Self::Search => settings.search_limit,
            Self::Rewards => settings.rewards_limit,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Rewards => "rewards",
        }
    }
}

/// Extract the client key from proxy headers, falling back to the peer
/// address.
fn client_key(headers: &HeaderMap, request: &Request) -> String {
    // Ordered by trust: Cloudflare's real client IP first, then the
    // standard proxy headers, then Fly.io's.
    const IP_HEADERS: [&str; 4] = [
        "cf-connecting-ip",
        "x-forwarded-for",
        "x-real-ip",
        "fly-client-ip",
    ];

    for header in IP_HEADERS {
        let value = headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            // X-Forwarded-For is a chain; the first entry is the client.
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(ip) = value {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |info| info.0.ip().to_string())
}

/// Count this request against the category budget; 429 when over.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    category: RateLimitCategory,
    request: Request,
    next: Next,
) -> Response {
    // Budgets are per category per client: one bucket for a client's
    // search traffic, another for its rewards traffic.
    let key = format!("{}:{}", category.as_str(), client_key(request.headers(), &request));
    let limit = category.limit(&state);

    if state.rate_limiter().check(&key, limit).is_allowed() {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, ?category, "rate limit exceeded");
        ApiError::RateLimited.into_response()
    }
}

/// Middleware wrapper for the search budget.
pub async fn search_rate_limit(
    state: State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce_rate_limit(state, RateLimitCategory::Search, request, next).await
}

/// Middleware wrapper for the rewards budget.
pub async fn rewards_rate_limit(
    state: State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce_rate_limit(state, RateLimitCategory::Rewards, request, next).await
}
