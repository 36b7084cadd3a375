//! Active alert domain model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::hazard::{Hazard, HazardId, Severity};

/// The single hazard currently presented to the user as in range.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAlert {
    pub hazard: Hazard,
    /// Distance in meters at the moment of detection
    pub distance_meters: f64,
}

impl ActiveAlert {
    pub fn new(hazard: Hazard, distance_meters: f64) -> Self {
        Self {
            hazard,
            distance_meters,
        }
    }

    pub fn hazard_id(&self) -> &HazardId {
        &self.hazard.id
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    /// Desktop notification describing this alert.
    pub fn notification(&self) -> AlertNotification {
        AlertNotification {
            title: "Hazard Alert!".to_string(),
            body: format!(
                "{}: You are entering a danger zone. {}",
                self.hazard.severity.as_str().to_uppercase(),
                self.hazard.description
            ),
            tag: format!("hazard-{}", self.hazard.id),
            require_interaction: true,
        }
    }
}

/// Notification payload raised alongside an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotification {
    pub title: String,
    pub body: String,
    /// Replaces an earlier notification with the same tag.
    pub tag: String,
    pub require_interaction: bool,
}

/// Hazards the user dismissed during this session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcknowledgedSet {
    ids: HashSet<HazardId>,
}

impl AcknowledgedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: HazardId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &HazardId) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Active alert in API responses: the hazard plus its computed distance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAlertResponse {
    pub id: HazardId,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: Severity,
    pub safety_radius: f64,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub distance: f64,
    pub distance_km: f64,
    pub recommended_action: String,
    pub notification: AlertNotification,
}

impl From<&ActiveAlert> for ActiveAlertResponse {
    fn from(a: &ActiveAlert) -> Self {
        let h = &a.hazard;
        Self {
            id: h.id.clone(),
            latitude: h.coordinate.map(|c| c.latitude),
            longitude: h.coordinate.map(|c| c.longitude),
            severity: h.severity,
            safety_radius: h.safety_radius,
            description: h.description.clone(),
            created_at: h.created_at,
            distance: a.distance_meters,
            distance_km: a.distance_km(),
            recommended_action: h.severity.recommended_action().to_string(),
            notification: a.notification(),
        }
    }
}

/// Response for reading the current alert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAlertResponse {
    pub alert: Option<ActiveAlertResponse>,
}

/// Response for acknowledging the current alert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeAlertResponse {
    /// `None` when there was nothing to acknowledge.
    pub acknowledged_hazard_id: Option<HazardId>,
    pub acknowledged_count: usize,
    /// The next alert, if re-evaluation surfaced one.
    pub alert: Option<ActiveAlertResponse>,
}

/// Response after replacing the hazard snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceHazardsResponse {
    pub accepted: usize,
    pub skipped: usize,
    pub alert: Option<ActiveAlertResponse>,
}
