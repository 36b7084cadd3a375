//! Hazard domain model.
//!
//! Hazards are owned by the external store. Each refresh delivers the whole
//! list as JSON rows; [`HazardSnapshot::parse`] turns those rows into domain
//! values, keeping the store's order.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::location::Coordinate;

/// Store-assigned hazard identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HazardId(String);

impl HazardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HazardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HazardId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for HazardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Stores hand out either text (uuid) or integer primary keys.
impl<'de> Deserialize<'de> for HazardId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) if s.is_empty() => {
                Err(serde::de::Error::custom("hazard id must not be empty"))
            }
            RawId::Text(s) => Ok(HazardId(s)),
            RawId::Number(n) => Ok(HazardId(n.to_string())),
        }
    }
}

/// Hazard severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Converts to the store's string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Guidance shown alongside an alert of this severity.
    pub fn recommended_action(&self) -> &'static str {
        match self {
            Severity::Critical => "Evacuate immediately! Seek shelter now!",
            Severity::High => "Stay alert. Prepare to evacuate if necessary.",
            Severity::Medium => "Exercise caution. Monitor the situation.",
            Severity::Low => "Stay informed. No immediate action required.",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hazard row exactly as the external store delivers it.
///
/// Only `id` is required. Every other field is read leniently: a value of
/// the wrong shape reads as absent and [`Hazard::from`] decides what that
/// means.
#[derive(Debug, Clone, Deserialize)]
pub struct HazardRow {
    pub id: HazardId,
    #[serde(default, deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(default, alias = "severity_level", deserialize_with = "lenient_text")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub safety_radius: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

// Numeric columns may arrive as JSON numbers or numeric strings.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// A reported danger zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Hazard {
    pub id: HazardId,
    /// `None` when the row carried no usable coordinate.
    pub coordinate: Option<Coordinate>,
    pub severity: Severity,
    /// Meters
    pub safety_radius: f64,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<HazardRow> for Hazard {
    fn from(row: HazardRow) -> Self {
        let coordinate = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Coordinate::try_new(lat, lon).ok(),
            _ => None,
        };

        let severity = row
            .severity
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                warn!(
                    hazard_id = %row.id,
                    severity = ?row.severity,
                    "Unrecognized hazard severity, treating as medium"
                );
                Severity::Medium
            });

        let created_at = row
            .created_at
            .as_deref()
            .and_then(|s| s.parse::<DateTime<Utc>>().ok());

        Self {
            id: row.id,
            coordinate,
            severity,
            // A missing radius reads as 0, which never qualifies.
            safety_radius: row.safety_radius.unwrap_or(0.0),
            description: row.description.unwrap_or_default(),
            created_at,
        }
    }
}

impl Hazard {
    pub fn new(
        id: impl Into<HazardId>,
        coordinate: Coordinate,
        severity: Severity,
        safety_radius: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            coordinate: Some(coordinate),
            severity,
            safety_radius,
            description: description.into(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn has_valid_radius(&self) -> bool {
        shared::validation::validate_safety_radius(self.safety_radius).is_ok()
    }

    /// Whether this hazard can take part in proximity evaluation.
    pub fn is_evaluable(&self) -> bool {
        self.coordinate.is_some() && self.has_valid_radius()
    }

    /// Distance in meters from `point`, if the hazard has a coordinate.
    pub fn distance_from(&self, point: &Coordinate) -> Option<f64> {
        self.coordinate.map(|c| point.distance_to(&c))
    }
}

/// A full refresh of the hazard list.
#[derive(Debug, Clone, Default)]
pub struct HazardSnapshot {
    pub hazards: Vec<Hazard>,
    /// Rows dropped because they carried no usable id.
    pub skipped: usize,
}

impl HazardSnapshot {
    /// Parses store rows in order. A row without a usable id is skipped,
    /// never the whole refresh. Rows that cannot be placed or measured are
    /// kept; evaluation passes over them.
    pub fn parse(rows: Vec<serde_json::Value>) -> Self {
        let mut snapshot = HazardSnapshot {
            hazards: Vec::with_capacity(rows.len()),
            skipped: 0,
        };

        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<HazardRow>(row) {
                Ok(row) => snapshot.hazards.push(row.into()),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed hazard row");
                    snapshot.skipped += 1;
                }
            }
        }

        snapshot
    }
}

/// Request payload for replacing the hazard snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceHazardsRequest {
    pub hazards: Vec<serde_json::Value>,
}

/// Hazard in API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardResponse {
    pub id: HazardId,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: Severity,
    pub safety_radius: f64,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Hazard> for HazardResponse {
    fn from(h: &Hazard) -> Self {
        Self {
            id: h.id.clone(),
            latitude: h.coordinate.map(|c| c.latitude),
            longitude: h.coordinate.map(|c| c.longitude),
            severity: h.severity,
            safety_radius: h.safety_radius,
            description: h.description.clone(),
            created_at: h.created_at,
        }
    }
}

/// Response for listing the current snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHazardsResponse {
    pub hazards: Vec<HazardResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;
    use serde_json::json;

    fn row(id: serde_json::Value, lat: serde_json::Value, lon: serde_json::Value) -> serde_json::Value {
        let description: String = Sentence(3..8).fake();
        json!({
            "id": id,
            "latitude": lat,
            "longitude": lon,
            "severity": "high",
            "safety_radius": 500,
            "description": description,
            "created_at": "2024-05-01T12:00:00Z"
        })
    }

    #[test]
    fn test_severity_parses_case_insensitively() {
        for severity in [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ] {
            assert_eq!(severity.as_str().parse::<Severity>(), Ok(severity));
        }
        assert_eq!("CRITICAL".parse::<Severity>(), Ok(Severity::Critical));
        assert!("extreme".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_recommended_action() {
        assert_eq!(
            Severity::Critical.recommended_action(),
            "Evacuate immediately! Seek shelter now!"
        );
        assert_eq!(
            Severity::Low.recommended_action(),
            "Stay informed. No immediate action required."
        );
    }

    #[test]
    fn test_hazard_row_with_severity_level_alias() {
        let json = json!({
            "id": "h1",
            "latitude": 40.001,
            "longitude": -73.0,
            "severity_level": "critical",
            "safety_radius": 200.0,
            "description": "Gas leak",
            "created_at": "2024-05-01T12:00:00Z"
        });

        let hazard: Hazard = serde_json::from_value::<HazardRow>(json).unwrap().into();
        assert_eq!(hazard.id, HazardId::from("h1"));
        assert_eq!(hazard.severity, Severity::Critical);
        assert_eq!(hazard.coordinate, Some(Coordinate::new(40.001, -73.0)));
        assert!(hazard.is_evaluable());
    }

    #[test]
    fn test_hazard_id_accepts_integers() {
        let id: HazardId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(id.as_str(), "42");
        assert!(serde_json::from_value::<HazardId>(json!("")).is_err());
    }

    #[test]
    fn test_hazard_missing_coordinate_is_not_evaluable() {
        let hazard: Hazard = serde_json::from_value::<HazardRow>(row(json!("h2"), json!(null), json!(-73.0)))
            .unwrap()
            .into();
        assert!(hazard.coordinate.is_none());
        assert!(!hazard.is_evaluable());
        assert!(hazard.distance_from(&Coordinate::new(40.0, -73.0)).is_none());
    }

    #[test]
    fn test_hazard_out_of_range_coordinate_is_dropped() {
        let hazard: Hazard = serde_json::from_value::<HazardRow>(row(json!("h3"), json!(95.0), json!(10.0)))
            .unwrap()
            .into();
        assert!(hazard.coordinate.is_none());
    }

    #[test]
    fn test_hazard_invalid_radius_is_not_evaluable() {
        let mut hazard = Hazard::new("h4", Coordinate::new(0.0, 0.0), Severity::Low, 0.0, "");
        assert!(!hazard.is_evaluable());
        hazard.safety_radius = 10.0;
        assert!(hazard.is_evaluable());
    }

    #[test]
    fn test_snapshot_preserves_order_and_skips_rows_without_id() {
        let rows = vec![
            row(json!("newest"), json!(40.0), json!(-73.0)),
            json!({"severity": "high", "latitude": 40.0, "longitude": -73.0}),
            json!({"id": "", "severity": "low"}),
            row(json!(7), json!(null), json!(null)),
            row(json!("oldest"), json!(41.0), json!(-74.0)),
        ];

        let snapshot = HazardSnapshot::parse(rows);
        assert_eq!(snapshot.skipped, 2);
        let ids: Vec<&str> = snapshot.hazards.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "7", "oldest"]);
    }

    #[test]
    fn test_unknown_or_missing_severity_reads_as_medium() {
        let snapshot = HazardSnapshot::parse(vec![
            json!({
                "id": "extreme",
                "latitude": 40.001,
                "longitude": -73.0,
                "severity_level": "extreme",
                "safety_radius": 200
            }),
            json!({"id": "bare", "latitude": 40.0, "longitude": -73.0, "safety_radius": 50}),
            json!({"id": "numeric", "severity": 3, "safety_radius": 50}),
        ]);

        assert_eq!(snapshot.skipped, 0);
        assert!(snapshot
            .hazards
            .iter()
            .all(|h| h.severity == Severity::Medium));
        assert!(snapshot.hazards[0].is_evaluable());
        assert!(snapshot.hazards[1].is_evaluable());
    }

    #[test]
    fn test_missing_or_unparseable_created_at_is_kept() {
        let snapshot = HazardSnapshot::parse(vec![
            json!({"id": "a", "latitude": 40.0, "longitude": -73.0, "severity": "low", "safety_radius": 10}),
            json!({"id": "b", "latitude": 40.0, "longitude": -73.0, "severity": "low", "safety_radius": 10, "created_at": "yesterday"}),
            row(json!("c"), json!(40.0), json!(-73.0)),
        ]);

        assert_eq!(snapshot.hazards.len(), 3);
        assert!(snapshot.hazards[0].created_at.is_none());
        assert!(snapshot.hazards[1].created_at.is_none());
        assert_eq!(
            snapshot.hazards[2].created_at.map(|t| t.to_rfc3339()),
            Some("2024-05-01T12:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_numeric_strings_are_accepted_and_missing_radius_is_not_evaluable() {
        let snapshot = HazardSnapshot::parse(vec![
            json!({"id": "s", "latitude": "40.5", "longitude": " -73.25 ", "severity": "high", "safety_radius": "150"}),
            json!({"id": "r", "latitude": 40.0, "longitude": -73.0, "severity": "high"}),
        ]);

        let placed = &snapshot.hazards[0];
        assert_eq!(placed.coordinate, Some(Coordinate::new(40.5, -73.25)));
        assert_eq!(placed.safety_radius, 150.0);
        assert!(placed.is_evaluable());

        assert_eq!(snapshot.hazards[1].safety_radius, 0.0);
        assert!(!snapshot.hazards[1].is_evaluable());
    }

    #[test]
    fn test_snapshot_empty() {
        let snapshot = HazardSnapshot::parse(vec![]);
        assert!(snapshot.hazards.is_empty());
        assert_eq!(snapshot.skipped, 0);
    }

    #[test]
    fn test_hazard_response_serialization() {
        let hazard = Hazard::new(
            "h1",
            Coordinate::new(40.001, -73.0),
            Severity::Medium,
            200.0,
            "Flooded underpass",
        );

        let json = serde_json::to_string(&HazardResponse::from(&hazard)).unwrap();
        assert!(json.contains("\"id\":\"h1\""));
        assert!(json.contains("\"safetyRadius\":200.0"));
        assert!(json.contains("\"severity\":\"medium\""));
        assert!(json.contains("\"createdAt\""));
    }
}
