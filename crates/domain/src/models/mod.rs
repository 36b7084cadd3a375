//! Domain models for Hazard Watch.

pub mod alert;
pub mod hazard;
pub mod location;

pub use alert::{AcknowledgedSet, ActiveAlert, AlertNotification};
pub use hazard::{Hazard, HazardId, HazardSnapshot, Severity};
pub use location::{
    Coordinate, LocationSample, PermissionStatus, PositionError, PositionErrorKind, PositionFix,
    PositionOptions, PositionOrigin, PositionUpdate, TrackingStatus, WatchId,
};
