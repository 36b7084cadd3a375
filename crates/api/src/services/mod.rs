//! Adapters between the HTTP surface and the domain services.

pub mod feedback;
pub mod position_feed;

pub use feedback::TracingFeedback;
pub use position_feed::{spawn_deadline_driver, PositionDeadline, ReportedPositionProvider};
