//! Domain layer for Hazard Watch.
//!
//! This crate contains:
//! - Domain models (Coordinate, LocationSample, Hazard, ActiveAlert)
//! - The proximity/alerting services (LocationSource, ProximityEngine)
//! - The session object that wires both together

pub mod models;
pub mod services;
