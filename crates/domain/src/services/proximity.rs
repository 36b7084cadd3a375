//! Proximity evaluation and the single active alert.
//!
//! At most one alert is active. The first hazard in store order that is
//! within its safety radius and not yet acknowledged wins; while an alert is
//! active no other hazard replaces it, and only [`ProximityEngine::acknowledge`]
//! clears it.

use tracing::{debug, info};

use super::feedback::{emit_alert_feedback, AlertFeedback};
use crate::models::{AcknowledgedSet, ActiveAlert, Coordinate, Hazard, HazardId, LocationSample};

/// Result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// No location yet, or the hazard list is empty.
    Skipped,
    /// An alert is already active and was left untouched.
    Held(HazardId),
    /// No hazard qualified.
    NoMatch,
    /// A new alert was raised for this hazard.
    Triggered(HazardId),
}

/// First hazard, in list order, that is in range of `location` and not
/// acknowledged. Hazards without a coordinate or with a non-positive radius
/// are skipped.
pub fn find_alert(
    location: &Coordinate,
    hazards: &[Hazard],
    acknowledged: &AcknowledgedSet,
) -> Option<ActiveAlert> {
    for hazard in hazards {
        if !hazard.is_evaluable() {
            debug!(hazard_id = %hazard.id, "Skipping hazard without usable coordinate or radius");
            continue;
        }

        let Some(distance) = hazard.distance_from(location) else {
            continue;
        };

        if distance <= hazard.safety_radius && !acknowledged.contains(&hazard.id) {
            return Some(ActiveAlert::new(hazard.clone(), distance));
        }
    }

    None
}

/// Owns the active alert and the acknowledged set for one session.
pub struct ProximityEngine<F: AlertFeedback> {
    active_alert: Option<ActiveAlert>,
    acknowledged: AcknowledgedSet,
    alerts_triggered: u64,
    feedback: F,
}

impl<F: AlertFeedback> ProximityEngine<F> {
    pub fn new(feedback: F) -> Self {
        Self {
            active_alert: None,
            acknowledged: AcknowledgedSet::new(),
            alerts_triggered: 0,
            feedback,
        }
    }

    /// Re-evaluate against the current location and hazard snapshot.
    pub fn evaluate(
        &mut self,
        location: Option<&LocationSample>,
        hazards: &[Hazard],
    ) -> EvaluationOutcome {
        let Some(location) = location else {
            return EvaluationOutcome::Skipped;
        };
        if hazards.is_empty() {
            return EvaluationOutcome::Skipped;
        }

        if let Some(active) = &self.active_alert {
            return EvaluationOutcome::Held(active.hazard_id().clone());
        }

        match find_alert(&location.coordinate, hazards, &self.acknowledged) {
            Some(alert) => {
                let hazard_id = alert.hazard_id().clone();
                info!(
                    hazard_id = %hazard_id,
                    severity = %alert.hazard.severity,
                    distance_meters = alert.distance_meters,
                    safety_radius = alert.hazard.safety_radius,
                    "Hazard alert triggered"
                );
                emit_alert_feedback(&self.feedback, &alert);
                self.active_alert = Some(alert);
                self.alerts_triggered += 1;
                EvaluationOutcome::Triggered(hazard_id)
            }
            None => EvaluationOutcome::NoMatch,
        }
    }

    /// Dismiss the active alert. Returns the acknowledged hazard id, or
    /// `None` when no alert was active.
    pub fn acknowledge(&mut self) -> Option<HazardId> {
        let alert = self.active_alert.take()?;
        let hazard_id = alert.hazard.id;
        self.acknowledged.insert(hazard_id.clone());
        info!(hazard_id = %hazard_id, "Hazard alert acknowledged");
        Some(hazard_id)
    }

    /// Forget all acknowledgements. The active alert is left as is.
    pub fn reset_acknowledgements(&mut self) {
        let cleared = self.acknowledged.len();
        self.acknowledged.clear();
        info!(cleared, "Hazard acknowledgements reset");
    }

    pub fn active_alert(&self) -> Option<&ActiveAlert> {
        self.active_alert.as_ref()
    }

    pub fn acknowledged(&self) -> &AcknowledgedSet {
        &self.acknowledged
    }

    /// Alerts raised over the engine's lifetime.
    pub fn alerts_triggered(&self) -> u64 {
        self.alerts_triggered
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }
}
