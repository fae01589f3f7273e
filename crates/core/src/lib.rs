//! Wayfarer Core - Shared types and booking rules.
//!
//! This crate provides the types used across all Wayfarer components:
//! - `api` - JSON API for listings, bookings, and reviews
//! - `cli` - Command-line tools for migrations and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Storage and transport live in `wayfarer-api`.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and enums
//! - [`models`] - Entity records and change sets
//! - [`validation`] - Booking, review, and listing rules plus price derivation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::{BookingQuote, ValidationError};
