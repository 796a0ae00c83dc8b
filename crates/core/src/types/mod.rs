//! Shared domain types.
//!
//! - [`id`] - Newtype wrappers for entity identifiers
//! - [`location`] - Coordinates and business location records

pub mod id;
pub mod location;

pub use id::{BusinessId, ClubId, UserId};
pub use location::{BusinessLocation, Coordinate, CoordinateError};
