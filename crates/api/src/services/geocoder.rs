//! Geocoding client: free-text address to coordinate.
//!
//! Wraps the Google Geocoding API. The contract is deliberately small:
//! the first result's coordinate, or a [`GeocodeError`] when the provider
//! returns zero results, a non-success status, or is unreachable. There
//! are no retries here - retry policy belongs to the caller.
//!
//! Geocoding is idempotent for a fixed address string, so results are
//! cached by normalized address text; a cache hit costs no network call.

use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sipclub_core::types::Coordinate;
use thiserror::Error;

use crate::config::GeocoderConfig;

/// How long a resolved address stays cached.
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Upper bound on cached addresses.
const CACHE_CAPACITY: u64 = 10_000;

/// Errors that can occur when resolving an address.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("geocoder status: {0}")]
    Status(String),

    /// Provider found nothing for the address.
    #[error("no geocoding results for address")]
    NoResults,

    /// Response body did not match the expected shape, or the coordinate
    /// was out of range.
    #[error("geocoder response parse error: {0}")]
    Parse(String),
}

/// Geocoding API client.
#[derive(Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: secrecy::SecretString,
    cache: Cache<String, Coordinate>,
}

impl Geocoder {
    /// Create a new geocoding client.
    ///
    /// The underlying HTTP client carries the configured timeout, so a
    /// hung provider surfaces as [`GeocodeError::Http`] instead of
    /// stalling the caller.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        })
    }

    /// Resolve a free-text address to a coordinate.
    ///
    /// # Errors
    ///
    /// `NoResults` when the provider matches nothing, `Status` for a
    /// provider-reported failure, `Http` for transport failures and
    /// timeouts, `Parse` for an unusable response body.
    pub async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let key = normalize_address(address);
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let coordinate = self.fetch(address).await?;
        self.cache.insert(key, coordinate).await;
        Ok(coordinate)
    }

    async fn fetch(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let url = format!(
            "{}?address={}&key={}",
            self.endpoint,
            urlencoding::encode(address),
            self.api_key.expose_secret()
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(format!("HTTP {}", status.as_u16())));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;

        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Err(GeocodeError::NoResults),
            other => return Err(GeocodeError::Status(other.to_owned())),
        }

        let first = body.results.into_iter().next().ok_or(GeocodeError::NoResults)?;
        Coordinate::validated(first.geometry.location.lat, first.geometry.location.lng)
            .map_err(|e| GeocodeError::Parse(e.to_string()))
    }
}

/// Cache key: trimmed, lowercased, inner whitespace collapsed.
fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}
