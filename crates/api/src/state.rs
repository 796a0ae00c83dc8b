//! Application state shared across handlers.

use std::sync::Arc;

use sipclub_core::ratelimit::RateLimiter;
use sipclub_core::token::RedemptionTokenService;

use crate::config::ApiConfig;
use crate::directory::BusinessDirectory;
use crate::ledger::{LedgerStore, RewardsService};
use crate::services::geocoder::{GeocodeError, Geocoder};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds configuration and the injectable
/// components (directory, rewards service, geocoder, rate limiter) so
/// tests can construct isolated instances per test case.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    directory: Arc<dyn BusinessDirectory>,
    rewards: RewardsService,
    geocoder: Option<Geocoder>,
    rate_limiter: RateLimiter,
}

impl AppState {
    /// Assemble state from configuration and the two store seams.
    ///
    /// A missing geocoder key leaves `geocoder` as `None`: address
    /// resolution is disabled, everything else runs.
    ///
    /// # Errors
    ///
    /// Returns `GeocodeError` if the geocoder HTTP client fails to build.
    pub fn new(
        config: ApiConfig,
        directory: Arc<dyn BusinessDirectory>,
        ledger_store: Arc<dyn LedgerStore>,
    ) -> Result<Self, GeocodeError> {
        let geocoder = config
            .geocoder
            .as_ref()
            .map(Geocoder::new)
            .transpose()?;
        let tokens = RedemptionTokenService::new(config.token_max_age);
        let rewards = RewardsService::new(ledger_store, config.rewards.clone(), tokens);
        let rate_limiter = RateLimiter::new(config.rate_limit.window);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                directory,
                rewards,
                geocoder,
                rate_limiter,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the business directory.
    #[must_use]
    pub fn directory(&self) -> &dyn BusinessDirectory {
        self.inner.directory.as_ref()
    }

    /// Get a reference to the rewards service.
    #[must_use]
    pub fn rewards(&self) -> &RewardsService {
        &self.inner.rewards
    }

    /// Get the geocoder, if one is configured.
    #[must_use]
    pub fn geocoder(&self) -> Option<&Geocoder> {
        self.inner.geocoder.as_ref()
    }

    /// Get a reference to the shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }
}
