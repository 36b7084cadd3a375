//! Alert feedback for the server process.
//!
//! There is no speaker or vibration motor on the server side, so cues are
//! emitted as structured log events and counted in metrics.

use domain::models::AlertNotification;
use domain::services::{AlertFeedback, FeedbackError};
use tracing::info;

use crate::config::FeedbackConfig;
use crate::middleware::metrics::record_alert_feedback;

#[derive(Debug, Clone)]
pub struct TracingFeedback {
    tone_enabled: bool,
    vibration_enabled: bool,
}

impl TracingFeedback {
    pub fn new(config: &FeedbackConfig) -> Self {
        Self {
            tone_enabled: config.tone_enabled,
            vibration_enabled: config.vibration_enabled,
        }
    }
}

impl AlertFeedback for TracingFeedback {
    fn play_tone(&self) -> Result<(), FeedbackError> {
        if !self.tone_enabled {
            return Err(FeedbackError::Unsupported("alert tone disabled".to_string()));
        }
        info!(cue = "tone", "Playing alert tone");
        record_alert_feedback("tone");
        Ok(())
    }

    fn supports_vibration(&self) -> bool {
        self.vibration_enabled
    }

    fn vibrate(&self, pattern_ms: &[u32]) -> Result<(), FeedbackError> {
        info!(cue = "vibration", pattern = ?pattern_ms, "Vibrating");
        record_alert_feedback("vibration");
        Ok(())
    }

    fn notify(&self, notification: &AlertNotification) -> Result<(), FeedbackError> {
        info!(
            cue = "notification",
            title = %notification.title,
            body = %notification.body,
            tag = %notification.tag,
            "Raising alert notification"
        );
        record_alert_feedback("notification");
        Ok(())
    }
}
