//! Time-tracking calculation engine
//!
//! This crate turns raw clock-in/clock-out bookings into daily time values
//! and aggregates them into monthly flextime accounts. Day plans describe the
//! expected schedule, tolerances, rounding, break rules, shift detection
//! candidates and cross-midnight handling; monthly evaluation rules decide how
//! much overtime is carried into the balance.
//!
//! The calculation is pure: the same bookings and configuration always give
//! the same result. Loading, resolving and persisting data is left to the
//! caller.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
