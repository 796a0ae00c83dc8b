//! Geographic coordinates and business location records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::BusinessId;

/// Errors produced when validating a coordinate at the API boundary.
#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    /// Latitude outside [-90, 90] degrees.
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180] degrees.
    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A WGS-84 point in decimal degrees.
///
/// Distance math assumes the ranges hold; validate with
/// [`Coordinate::validated`] where values cross a trust boundary (query
/// parameters, geocoder responses). Interior code treats coordinates as
/// already valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees, [-90, 90].
    pub latitude: f64,
    /// Longitude in decimal degrees, [-180, 180].
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without range checking.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateError` if either component is outside its WGS-84
    /// range (NaN fails both comparisons and is rejected).
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A participating retail outlet as published by the business directory.
///
/// The directory owns these records; the core treats each as an immutable
/// read-only snapshot for the duration of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessLocation {
    pub id: BusinessId,
    pub name: String,
    pub coordinate: Coordinate,
    pub city: String,
    pub state: String,
    pub address: String,
}
