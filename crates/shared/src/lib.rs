//! Shared utilities for Hazard Watch.
//!
//! This crate provides functionality used across the other crates:
//! - Great-circle distance (haversine)
//! - Common validation logic for coordinates and radii

pub mod geo;
pub mod validation;
