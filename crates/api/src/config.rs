//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional (all have defaults)
//! - `SIPCLUB_HOST` - Bind address (default: 127.0.0.1)
//! - `SIPCLUB_PORT` - Listen port (default: 3000)
//! - `SIPCLUB_FALLBACK_PAGE` - Redirect target when no club matches
//!   (default: /clubs)
//! - `SIPCLUB_CLUB_PAGE_BASE` - Base path for club pages (default: /clubs)
//! - `SIPCLUB_DIRECTORY_SEED` - Path to a JSON file of business locations
//! - `SIPCLUB_RATE_WINDOW_SECS` - Rate-limit window length (default: 60)
//! - `SIPCLUB_SEARCH_RATE_LIMIT` - Requests per window on search endpoints
//!   (default: 100)
//! - `SIPCLUB_REWARDS_RATE_LIMIT` - Requests per window on rewards
//!   endpoints (default: 30)
//! - `SIPCLUB_TIER_THRESHOLDS` - Ordered `TIER:MIN` pairs, e.g.
//!   `SILVER:100,GOLD:500,PLATINUM:1500`
//! - `SIPCLUB_FREE_DRINK_MILESTONE` - Purchases per free drink
//!   (default: 10)
//! - `SIPCLUB_TOKEN_MAX_AGE_HOURS` - Redemption token validity
//!   (default: 24)
//! - `GEOCODER_API_KEY` - Geocoding provider key; when absent, free-text
//!   address resolution is disabled but everything else still works
//! - `GEOCODER_ENDPOINT` - Override the provider URL (for tests/stubs)
//! - `GEOCODER_TIMEOUT_SECS` - Outbound call deadline (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use sipclub_core::rewards::{RewardsConfig, Tier, TierSchedule};
use thiserror::Error;

/// Default geocoding endpoint (Google Geocoding API).
const DEFAULT_GEOCODER_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid tier thresholds in {0}: {1}")]
    InvalidTierThresholds(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Where `GET /redirect` sends clients when no club matches.
    pub fallback_page: String,
    /// Base path for individual club pages.
    pub club_page_base: String,
    /// Optional JSON seed file for the in-memory directory.
    pub directory_seed: Option<PathBuf>,
    /// Rate-limiting configuration.
    pub rate_limit: RateLimitSettings,
    /// Loyalty program configuration.
    pub rewards: RewardsConfig,
    /// Redemption token validity window.
    pub token_max_age: chrono::Duration,
    /// Geocoder configuration; `None` disables address resolution only.
    pub geocoder: Option<GeocoderConfig>,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

/// Fixed-window rate-limit settings per endpoint category.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub window: Duration,
    pub search_limit: u32,
    pub rewards_limit: u32,
}

/// Geocoding provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeocoderConfig {
    pub api_key: SecretString,
    pub endpoint: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GeocoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderConfig")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    /// Absent variables fall back to defaults; a missing geocoder key is
    /// not an error, it disables that feature only.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("SIPCLUB_HOST", "127.0.0.1")?;
        let port = parse_env("SIPCLUB_PORT", "3000")?;
        let fallback_page = get_env_or_default("SIPCLUB_FALLBACK_PAGE", "/clubs");
        let club_page_base = get_env_or_default("SIPCLUB_CLUB_PAGE_BASE", "/clubs");
        let directory_seed = get_optional_env("SIPCLUB_DIRECTORY_SEED").map(PathBuf::from);

        let rate_limit = RateLimitSettings {
            window: Duration::from_secs(parse_env("SIPCLUB_RATE_WINDOW_SECS", "60")?),
            search_limit: parse_env("SIPCLUB_SEARCH_RATE_LIMIT", "100")?,
            rewards_limit: parse_env("SIPCLUB_REWARDS_RATE_LIMIT", "30")?,
        };

        let tier_schedule = match get_optional_env("SIPCLUB_TIER_THRESHOLDS") {
            Some(raw) => parse_tier_schedule(&raw)
                .map_err(|e| ConfigError::InvalidTierThresholds("SIPCLUB_TIER_THRESHOLDS".to_owned(), e))?,
            None => TierSchedule::default(),
        };
        let rewards = RewardsConfig {
            tier_schedule,
            free_drink_milestone: parse_env("SIPCLUB_FREE_DRINK_MILESTONE", "10")?,
        };

        let token_max_age =
            chrono::Duration::hours(parse_env::<i64>("SIPCLUB_TOKEN_MAX_AGE_HOURS", "24")?);

        let geocoder = match get_optional_env("GEOCODER_API_KEY") {
            Some(key) => Some(GeocoderConfig {
                api_key: SecretString::from(key),
                endpoint: get_env_or_default("GEOCODER_ENDPOINT", DEFAULT_GEOCODER_ENDPOINT),
                timeout: Duration::from_secs(parse_env("GEOCODER_TIMEOUT_SECS", "5")?),
            }),
            None => None,
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            fallback_page,
            club_page_base,
            directory_seed,
            rate_limit,
            rewards,
            token_max_age,
            geocoder,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The page a club redirects to, e.g. `/clubs/club-sea-01`.
    #[must_use]
    pub fn club_page(&self, club_id: &str) -> String {
        format!("{}/{club_id}", self.club_page_base.trim_end_matches('/'))
    }
}

impl Default for ApiConfig {
    /// Local-development defaults; geocoder and Sentry disabled.
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            fallback_page: "/clubs".to_owned(),
            club_page_base: "/clubs".to_owned(),
            directory_seed: None,
            rate_limit: RateLimitSettings {
                window: Duration::from_secs(60),
                search_limit: 100,
                rewards_limit: 30,
            },
            rewards: RewardsConfig::default(),
            token_max_age: chrono::Duration::hours(24),
            geocoder: None,
            sentry_dsn: None,
        }
    }
}

/// Parse `TIER:MIN` pairs separated by commas into a schedule.
fn parse_tier_schedule(raw: &str) -> Result<TierSchedule, String> {
    let mut thresholds: Vec<(Tier, u64)> = Vec::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (name, min) = pair
            .split_once(':')
            .ok_or_else(|| format!("expected TIER:MIN, got '{pair}'"))?;
        let tier = name.trim().parse::<Tier>().map_err(|e| e.to_string())?;
        let min = min
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("bad minimum in '{pair}': {e}"))?;
        thresholds.push((tier, min));
    }
    TierSchedule::new(thresholds).map_err(|e| e.to_string())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default string.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_tier_schedule_accepts_ordered_pairs() {
        let schedule = parse_tier_schedule("SILVER:100, GOLD:500, PLATINUM:1500").unwrap();
        assert_eq!(schedule.tier_for(150), Tier::Silver);
        assert_eq!(schedule.tier_for(2000), Tier::Platinum);
    }

    #[test]
    fn parse_tier_schedule_rejects_garbage() {
        assert!(parse_tier_schedule("SILVER").is_err());
        assert!(parse_tier_schedule("DIAMOND:100").is_err());
        assert!(parse_tier_schedule("SILVER:abc").is_err());
        // Out of order
        assert!(parse_tier_schedule("GOLD:500,SILVER:100").is_err());
    }

    #[test]
    fn club_page_joins_cleanly() {
        let mut config = ApiConfig::default();
        assert_eq!(config.club_page("club-1"), "/clubs/club-1");

        config.club_page_base = "/clubs/".to_owned();
        assert_eq!(config.club_page("club-1"), "/clubs/club-1");
    }

    #[test]
    fn default_socket_addr() {
        let config = ApiConfig::default();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn geocoder_config_debug_redacts_key() {
        let config = GeocoderConfig {
            api_key: SecretString::from("super_secret_key_value"),
            endpoint: DEFAULT_GEOCODER_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(5),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key_value"));
    }
}
