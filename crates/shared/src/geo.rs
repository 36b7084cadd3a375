//! Great-circle distance on a spherical Earth.
//!
//! Alert triggering compares this distance against hazard radii, so the
//! arithmetic is kept in the exact haversine form (degree conversion as
//! `deg * PI / 180`, squares as products) rather than an approximation.

use std::f64::consts::PI;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Converts decimal degrees to radians.
#[inline]
pub fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Haversine distance in meters between two points given in decimal degrees.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = to_radians(lat1);
    let phi2 = to_radians(lat2);
    let delta_phi = to_radians(lat2 - lat1);
    let delta_lambda = to_radians(lon2 - lon1);

    let half_phi = (delta_phi / 2.0).sin();
    let half_lambda = (delta_lambda / 2.0).sin();

    let a = half_phi * half_phi + phi1.cos() * phi2.cos() * half_lambda * half_lambda;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
