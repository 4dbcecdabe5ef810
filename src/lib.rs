//! Booking lifecycle and temporal query engine for item lending.
//!
//! Users reserve items listed by other users for bounded intervals. Owners
//! approve or reject reservations, and both sides list their bookings by
//! status or by position in time relative to a reference instant.

pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod model;
pub mod query;
pub mod service;
pub mod state;
pub mod store;
pub mod utils;
pub mod view;
