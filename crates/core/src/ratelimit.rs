//! Fixed-window rate limiting for public endpoints.
//!
//! One counter bucket per client token per active window, created lazily
//! on first request and evicted by TTL once the window plus a grace period
//! has elapsed since the last write, so memory is bounded by the number of
//! distinct active tokens.
//!
//! This is fixed-window counting, not a sliding window: a client can land
//! up to `2 x limit` requests spanning a window boundary. That burst is a
//! documented characteristic of the algorithm, not a bug.
//!
//! Construct one limiter per deployment (or per test) and share it; it is
//! an injectable component, not process-global state.

use std::time::{Duration, Instant};

use moka::sync::Cache;

/// Extra lifetime past the window before an idle bucket is evicted.
const EVICTION_GRACE: Duration = Duration::from_secs(30);

/// Upper bound on simultaneously tracked client tokens.
const MAX_TRACKED_TOKENS: u64 = 100_000;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Rejected,
}

impl RateLimitDecision {
    /// Whether the request may proceed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Per-token counter for the current window.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    window_start: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client token.
///
/// Increments are atomic per token: the cache's entry API evaluates the
/// read-modify-write closure exclusively for a given key, so concurrent
/// bursts cannot lose updates.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: Cache<String, Bucket>,
    window: Duration,
}

impl RateLimiter {
    /// Limiter with the given window length.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        let buckets = Cache::builder()
            .max_capacity(MAX_TRACKED_TOKENS)
            .time_to_live(window + EVICTION_GRACE)
            .build();
        Self { buckets, window }
    }

    /// Count a request for `token` against `limit`.
    ///
    /// The request is counted first and then compared, so the call that
    /// crosses the limit is itself denied while still occupying a slot in
    /// the window.
    #[must_use]
    pub fn check(&self, token: &str, limit: u32) -> RateLimitDecision {
        self.check_at(token, limit, Instant::now())
    }

    /// Clock-injected variant of [`check`](Self::check).
    ///
    /// `now` must be monotone across calls for a given token; tests use
    /// this to step time without sleeping.
    #[must_use]
    pub fn check_at(&self, token: &str, limit: u32, now: Instant) -> RateLimitDecision {
        let window = self.window;
        let entry = self
            .buckets
            .entry(token.to_owned())
            .and_upsert_with(|existing| match existing {
                Some(entry) => {
                    let bucket = entry.into_value();
                    if now.duration_since(bucket.window_start) >= window {
                        // Window elapsed: start a fresh one with this
                        // request as its first.
                        Bucket {
                            window_start: now,
                            count: 1,
                        }
                    } else {
                        Bucket {
                            window_start: bucket.window_start,
                            count: bucket.count.saturating_add(1),
                        }
                    }
                }
                None => Bucket {
                    window_start: now,
                    count: 1,
                },
            });

        if entry.into_value().count > limit {
            RateLimitDecision::Rejected
        } else {
            RateLimitDecision::Allowed
        }
    }

    /// The configured window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}
