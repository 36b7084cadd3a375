//! Domain services for Hazard Watch.
//!
//! Services contain the tracking and alerting logic that operates on domain
//! models.

pub mod feedback;
pub mod location_source;
pub mod proximity;
pub mod session;

pub use feedback::{
    emit_alert_feedback, AlertFeedback, FeedbackError, MockFeedback, VIBRATION_PATTERN_MS,
};
pub use location_source::{LocationSource, PositionProvider, UNSUPPORTED_MESSAGE};
pub use proximity::{find_alert, EvaluationOutcome, ProximityEngine};
pub use session::{SessionEvent, TrackingSession};
