//! Common validation utilities.

use validator::ValidationError;

fn range_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        Err(range_error(
            "latitude_range",
            "Latitude must be between -90 and 90",
        ))
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(range_error(
            "longitude_range",
            "Longitude must be between -180 and 180",
        ))
    }
}

/// Validates that a reported accuracy (meters) is non-negative.
pub fn validate_accuracy(accuracy: f64) -> Result<(), ValidationError> {
    if accuracy >= 0.0 {
        Ok(())
    } else {
        Err(range_error("accuracy_range", "Accuracy must be non-negative"))
    }
}

/// Validates that a hazard safety radius (meters) is finite and positive.
pub fn validate_safety_radius(radius: f64) -> Result<(), ValidationError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(range_error(
            "safety_radius_range",
            "Safety radius must be a positive number of meters",
        ))
    }
}

/// Validates that a timestamp (milliseconds since epoch) is not negative.
///
/// Device clocks are not trusted to be synchronized with ours, so no
/// freshness window is enforced here.
pub fn validate_timestamp(timestamp_millis: i64) -> Result<(), ValidationError> {
    if timestamp_millis >= 0 {
        Ok(())
    } else {
        Err(range_error(
            "timestamp_invalid",
            "Timestamp must be milliseconds since the Unix epoch",
        ))
    }
}
