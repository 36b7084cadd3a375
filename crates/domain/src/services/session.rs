//! A monitoring session: one location source, one proximity engine and the
//! latest hazard snapshot.
//!
//! Evaluation runs whenever the location changes, the hazard list is
//! replaced, or the acknowledged set changes.

use tracing::{debug, info};
use uuid::Uuid;

use super::feedback::AlertFeedback;
use super::location_source::{LocationSource, PositionProvider};
use super::proximity::{EvaluationOutcome, ProximityEngine};
use crate::models::{ActiveAlert, Hazard, HazardId, PositionUpdate};

/// Input delivered to a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Position(PositionUpdate),
    Hazards(Vec<Hazard>),
}

pub struct TrackingSession<P: PositionProvider, F: AlertFeedback> {
    session_id: Uuid,
    location: LocationSource<P>,
    proximity: ProximityEngine<F>,
    hazards: Vec<Hazard>,
}

impl<P: PositionProvider, F: AlertFeedback> TrackingSession<P, F> {
    pub fn new(provider: P, feedback: F) -> Self {
        let session_id = Uuid::new_v4();
        debug!(%session_id, "Tracking session created");
        Self {
            session_id,
            location: LocationSource::new(provider),
            proximity: ProximityEngine::new(feedback),
            hazards: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn start_tracking(&mut self) {
        self.location.start_tracking();
    }

    pub fn stop_tracking(&mut self) {
        self.location.stop_tracking();
    }

    /// Stop, forget acknowledgements, then start again. The last sample is
    /// kept, so previously acknowledged hazards in range alert again.
    pub fn restart_tracking(&mut self) -> EvaluationOutcome {
        info!(session_id = %self.session_id, "Restarting tracking session");
        self.location.stop_tracking();
        self.proximity.reset_acknowledgements();
        self.location.start_tracking();
        self.reevaluate()
    }

    /// Route an input to its handler.
    pub fn dispatch(&mut self, event: SessionEvent) -> Option<EvaluationOutcome> {
        match event {
            SessionEvent::Position(update) => self.on_position(update),
            SessionEvent::Hazards(hazards) => Some(self.on_hazards(hazards)),
        }
    }

    /// Apply a position completion. Evaluates only when the location changed.
    pub fn on_position(&mut self, update: PositionUpdate) -> Option<EvaluationOutcome> {
        if self.location.handle_update(update) {
            Some(self.reevaluate())
        } else {
            None
        }
    }

    /// Replace the hazard snapshot wholesale and evaluate.
    pub fn on_hazards(&mut self, hazards: Vec<Hazard>) -> EvaluationOutcome {
        debug!(count = hazards.len(), "Hazard snapshot replaced");
        self.hazards = hazards;
        self.reevaluate()
    }

    pub fn reevaluate(&mut self) -> EvaluationOutcome {
        self.proximity
            .evaluate(self.location.location(), &self.hazards)
    }

    /// Dismiss the active alert and look for the next one.
    pub fn acknowledge(&mut self) -> Option<HazardId> {
        let acknowledged = self.proximity.acknowledge()?;
        self.reevaluate();
        Some(acknowledged)
    }

    pub fn reset_acknowledgements(&mut self) -> EvaluationOutcome {
        self.proximity.reset_acknowledgements();
        self.reevaluate()
    }

    pub fn active_alert(&self) -> Option<&ActiveAlert> {
        self.proximity.active_alert()
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn location_source(&self) -> &LocationSource<P> {
        &self.location
    }

    pub fn location_source_mut(&mut self) -> &mut LocationSource<P> {
        &mut self.location
    }

    pub fn proximity(&self) -> &ProximityEngine<F> {
        &self.proximity
    }
}
