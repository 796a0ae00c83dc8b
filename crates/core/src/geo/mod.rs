//! Geospatial primitives: great-circle distance and nearest-location
//! matching.
//!
//! Both pieces are pure functions over in-memory data. Candidate sets are
//! expected to be pre-filtered by region before they get here; matching is
//! a deliberate O(n) linear scan. A spatial index (R-tree, grid) only
//! becomes worthwhile if candidate sets grow past a few thousand entries.

pub mod distance;
pub mod nearest;

pub use distance::{EARTH_RADIUS_KM, distance_km};
pub use nearest::{NearestMatch, find_nearest};
