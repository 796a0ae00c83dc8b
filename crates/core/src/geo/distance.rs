//! Haversine great-circle distance.

use crate::types::Coordinate;

/// Mean Earth radius in kilometres (spherical model).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometres.
///
/// Uses the haversine formula on a spherical Earth. The result is
/// symmetric, non-negative, and zero for identical points. Accuracy is
/// bounded by the spherical approximation (about 0.5% versus an
/// ellipsoid), which is plenty for "which outlet is closest" ranking.
///
/// Coordinate ranges are the caller's responsibility; validate at the
/// boundary, not here.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
