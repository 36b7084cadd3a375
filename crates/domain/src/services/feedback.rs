//! Audible and haptic alert feedback.
//!
//! Feedback is best-effort: every failure is swallowed and only logged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use thiserror::Error;

use crate::models::{ActiveAlert, AlertNotification};

/// On/off vibration durations in milliseconds.
pub const VIBRATION_PATTERN_MS: [u32; 5] = [200, 100, 200, 100, 200];

/// Feedback capability failure.
#[derive(Debug, Clone, Error)]
pub enum FeedbackError {
    #[error("Feedback not supported: {0}")]
    Unsupported(String),

    #[error("Feedback failed: {0}")]
    Failed(String),
}

/// Device capability for alert cues.
pub trait AlertFeedback: Send + Sync {
    /// Play the alert tone.
    fn play_tone(&self) -> Result<(), FeedbackError>;

    /// Whether the device can vibrate.
    fn supports_vibration(&self) -> bool;

    /// Vibrate with the given on/off pattern.
    fn vibrate(&self, pattern_ms: &[u32]) -> Result<(), FeedbackError>;

    /// Raise a system notification. Devices without one do nothing.
    fn notify(&self, _notification: &AlertNotification) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Fire all cues for a newly surfaced alert. Never fails.
pub fn emit_alert_feedback(feedback: &dyn AlertFeedback, alert: &ActiveAlert) {
    let hazard_id = alert.hazard_id();

    if let Err(e) = feedback.play_tone() {
        tracing::debug!(hazard_id = %hazard_id, error = %e, "Alert tone failed");
    }

    if feedback.supports_vibration() {
        if let Err(e) = feedback.vibrate(&VIBRATION_PATTERN_MS) {
            tracing::debug!(hazard_id = %hazard_id, error = %e, "Alert vibration failed");
        }
    }

    if let Err(e) = feedback.notify(&alert.notification()) {
        tracing::debug!(hazard_id = %hazard_id, error = %e, "Alert notification failed");
    }
}

/// Mock feedback for development and testing.
///
/// Counts cues instead of producing them.
#[derive(Debug, Default)]
pub struct MockFeedback {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    /// Whether to report vibration support.
    pub vibration_supported: bool,
    tones: AtomicUsize,
    vibrations: AtomicUsize,
    notifications: AtomicUsize,
    last_pattern: Mutex<Option<Vec<u32>>>,
    last_notification: Mutex<Option<AlertNotification>>,
}

impl MockFeedback {
    /// Create a new mock with vibration support.
    pub fn new() -> Self {
        Self {
            vibration_supported: true,
            ..Default::default()
        }
    }

    /// Create a mock whose every cue fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            vibration_supported: true,
            ..Default::default()
        }
    }

    /// Create a mock for a device without a vibration motor.
    pub fn without_vibration() -> Self {
        Self::default()
    }

    pub fn tone_count(&self) -> usize {
        self.tones.load(Ordering::SeqCst)
    }

    pub fn vibration_count(&self) -> usize {
        self.vibrations.load(Ordering::SeqCst)
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }

    pub fn last_pattern(&self) -> Option<Vec<u32>> {
        self.last_pattern.lock().ok().and_then(|last| last.clone())
    }

    pub fn last_notification(&self) -> Option<AlertNotification> {
        self.last_notification
            .lock()
            .ok()
            .and_then(|last| last.clone())
    }

    fn outcome(&self, what: &str) -> Result<(), FeedbackError> {
        if self.simulate_failure {
            Err(FeedbackError::Failed(format!("simulated {} failure", what)))
        } else {
            Ok(())
        }
    }
}

impl AlertFeedback for MockFeedback {
    fn play_tone(&self) -> Result<(), FeedbackError> {
        self.tones.fetch_add(1, Ordering::SeqCst);
        self.outcome("tone")
    }

    fn supports_vibration(&self) -> bool {
        self.vibration_supported
    }

    fn vibrate(&self, pattern_ms: &[u32]) -> Result<(), FeedbackError> {
        tracing::debug!(pattern = ?pattern_ms, "Mock: Would vibrate");
        self.vibrations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_pattern.lock() {
            *last = Some(pattern_ms.to_vec());
        }
        self.outcome("vibration")
    }

    fn notify(&self, notification: &AlertNotification) -> Result<(), FeedbackError> {
        self.notifications.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_notification.lock() {
            *last = Some(notification.clone());
        }
        self.outcome("notification")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Hazard, Severity};

    fn alert() -> ActiveAlert {
        let hazard = Hazard::new(
            "h1",
            Coordinate::new(40.001, -73.0),
            Severity::High,
            200.0,
            "Downed power line",
        );
        ActiveAlert::new(hazard, 111.2)
    }

    #[test]
    fn test_vibration_pattern() {
        assert_eq!(VIBRATION_PATTERN_MS, [200, 100, 200, 100, 200]);
    }

    #[test]
    fn test_emit_fires_all_cues() {
        let feedback = MockFeedback::new();
        emit_alert_feedback(&feedback, &alert());

        assert_eq!(feedback.tone_count(), 1);
        assert_eq!(feedback.vibration_count(), 1);
        assert_eq!(feedback.notification_count(), 1);
        assert_eq!(feedback.last_pattern(), Some(vec![200, 100, 200, 100, 200]));
        assert_eq!(
            feedback.last_notification().unwrap().tag,
            "hazard-h1".to_string()
        );
    }

    #[test]
    fn test_emit_skips_vibration_when_unsupported() {
        let feedback = MockFeedback::without_vibration();
        emit_alert_feedback(&feedback, &alert());

        assert_eq!(feedback.tone_count(), 1);
        assert_eq!(feedback.vibration_count(), 0);
    }

    #[test]
    fn test_emit_swallows_failures() {
        let feedback = MockFeedback::failing();
        emit_alert_feedback(&feedback, &alert());

        // A failing tone does not stop the remaining cues.
        assert_eq!(feedback.tone_count(), 1);
        assert_eq!(feedback.vibration_count(), 1);
        assert_eq!(feedback.notification_count(), 1);
    }

    #[test]
    fn test_feedback_error_display() {
        assert_eq!(
            FeedbackError::Unsupported("audio".to_string()).to_string(),
            "Feedback not supported: audio"
        );
        assert_eq!(
            FeedbackError::Failed("busy".to_string()).to_string(),
            "Feedback failed: busy"
        );
    }
}
