//! HTTP middleware stack for the public API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (correlate logs across a request)
//! 4. Rate limiting (per-category fixed-window budgets)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{RateLimitCategory, rewards_rate_limit, search_rate_limit};
pub use request_id::request_id_middleware;
