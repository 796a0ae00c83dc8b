//! Clients for external collaborators.

pub mod geocoder;
