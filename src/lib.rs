//! Deterministic itinerary scheduling and recommendation engine.
//!
//! The engine receives plain data (activities, opening hours, fixed trip
//! blocks, preferences) and returns plain data (placements, operations,
//! warnings). It performs no I/O, calls no model, and installs no global
//! state, so calls are reproducible and can run concurrently across
//! requests without coordination.

pub mod error;
pub mod models;
pub mod services;
pub mod utils;
