//! Location domain model.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::alert::ActiveAlertResponse;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Rejected coordinate components.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a coordinate, rejecting out-of-range (or NaN) components.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        shared::validation::validate_latitude(latitude)
            .map_err(|_| CoordinateError::LatitudeOutOfRange(latitude))?;
        shared::validation::validate_longitude(longitude)
            .map_err(|_| CoordinateError::LongitudeOutOfRange(longitude))?;
        Ok(Self::new(latitude, longitude))
    }

    pub fn is_valid(&self) -> bool {
        Self::try_new(self.latitude, self.longitude).is_ok()
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        shared::geo::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Platform permission state for positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    #[default]
    Prompt,
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Prompt => "prompt",
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
        }
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw position reading as produced by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PositionFix {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    /// Accuracy radius in meters
    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: f64,

    /// Timestamp in milliseconds since epoch
    #[validate(custom(function = "shared::validation::validate_timestamp"))]
    pub timestamp: i64,
}

/// Why a position request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl PositionErrorKind {
    pub fn default_message(&self) -> &'static str {
        match self {
            PositionErrorKind::PermissionDenied => "User denied geolocation permission",
            PositionErrorKind::PositionUnavailable => "Position unavailable",
            PositionErrorKind::Timeout => "Geolocation request timed out",
        }
    }
}

/// A failed position request. Never escapes the location source; it is
/// recorded as observable state instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct PositionError {
    pub kind: PositionErrorKind,
    #[serde(default)]
    pub message: String,
}

impl PositionError {
    pub fn new(kind: PositionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error with the platform's stock message for `kind`.
    pub fn from_kind(kind: PositionErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }
}

/// Options passed to the positioning capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
}

impl PositionOptions {
    /// Initial fix: no cached position reuse.
    pub const ONE_SHOT: PositionOptions = PositionOptions {
        enable_high_accuracy: true,
        timeout_ms: 10_000,
        maximum_age_ms: 0,
    };

    /// Continuous subscription.
    pub const WATCH: PositionOptions = PositionOptions {
        enable_high_accuracy: true,
        timeout_ms: 5_000,
        maximum_age_ms: 5_000,
    };
}

/// Identifier of a continuous position subscription.
pub type WatchId = u64;

/// Which request a position completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionOrigin {
    OneShot,
    Watch(WatchId),
}

/// Asynchronous completion of a position request.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub origin: PositionOrigin,
    pub result: Result<PositionFix, PositionError>,
}

impl PositionUpdate {
    pub fn fix(origin: PositionOrigin, fix: PositionFix) -> Self {
        Self {
            origin,
            result: Ok(fix),
        }
    }

    pub fn error(origin: PositionOrigin, error: PositionError) -> Self {
        Self {
            origin,
            result: Err(error),
        }
    }
}

/// Wire form of a position completion reported by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionReport {
    Fix(PositionFix),
    Error(PositionError),
}

impl PositionReport {
    /// Converts the report into a completion result, filling in the stock
    /// message when the device sent none.
    pub fn into_result(self) -> Result<PositionFix, PositionError> {
        match self {
            PositionReport::Fix(fix) => Ok(fix),
            PositionReport::Error(err) if err.message.trim().is_empty() => {
                Err(PositionError::from_kind(err.kind))
            }
            PositionReport::Error(err) => Err(err),
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            PositionReport::Fix(_) => "fix",
            PositionReport::Error(_) => "error",
        }
    }
}

/// The current device location as seen by the proximity engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub coordinate: Coordinate,
    pub accuracy: f64,
    /// Milliseconds since epoch, non-decreasing across samples
    pub timestamp: i64,
}

impl LocationSample {
    pub fn from_fix(fix: &PositionFix) -> Self {
        Self {
            coordinate: Coordinate::new(fix.latitude, fix.longitude),
            accuracy: fix.accuracy,
            timestamp: fix.timestamp,
        }
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Coarse tracking state for a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingStatus {
    /// Waiting for the first fix.
    Acquiring,
    /// An error was recorded or permission is denied.
    Denied,
    /// A location sample is available.
    Active,
    Idle,
}

impl TrackingStatus {
    pub fn derive(
        acquiring: bool,
        has_error: bool,
        permission: PermissionStatus,
        has_location: bool,
    ) -> Self {
        if acquiring {
            TrackingStatus::Acquiring
        } else if has_error || permission == PermissionStatus::Denied {
            TrackingStatus::Denied
        } else if has_location {
            TrackingStatus::Active
        } else {
            TrackingStatus::Idle
        }
    }
}

/// Location sample in API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSampleResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl From<&LocationSample> for LocationSampleResponse {
    fn from(s: &LocationSample) -> Self {
        Self {
            latitude: s.coordinate.latitude,
            longitude: s.coordinate.longitude,
            accuracy: s.accuracy,
            timestamp: s.timestamp,
            captured_at: s.captured_at(),
        }
    }
}

/// Observable location source state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStateResponse {
    pub location: Option<LocationSampleResponse>,
    pub acquiring: bool,
    pub error: Option<String>,
    pub permission_status: PermissionStatus,
    pub tracking: bool,
    pub status: TrackingStatus,
}

/// Response after a device reports a position completion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPositionResponse {
    /// Whether the report changed the current location sample.
    pub applied: bool,
    pub state: LocationStateResponse,
    pub alert: Option<ActiveAlertResponse>,
}
