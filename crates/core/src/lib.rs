//! SipClub Core - Domain logic library.
//!
//! This crate contains the algorithmic heart of SipClub, free of any I/O:
//!
//! - [`geo`] - Great-circle distance and nearest-location matching
//! - [`rewards`] - The loyalty ledger state machine (points, streaks, tiers)
//! - [`token`] - Stateless redemption tokens for milestone rewards
//! - [`ratelimit`] - Fixed-window request budgeting for public endpoints
//! - [`types`] - Shared newtypes and location records
//!
//! # Architecture
//!
//! Everything here is a pure function or a small in-process component.
//! Persistence, HTTP, and the outbound geocoding call live in the `api`
//! crate; this crate never blocks on the network and can be tested without
//! a runtime.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod geo;
pub mod ratelimit;
pub mod rewards;
pub mod token;
pub mod types;

pub use types::*;
