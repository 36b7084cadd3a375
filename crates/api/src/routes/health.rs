//! Health check endpoint handlers.

use axum::{extract::State, Json};
use domain::models::TrackingStatus;
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub session: SessionHealth,
}

/// Monitoring session summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionHealth {
    pub session_id: Uuid,
    pub positioning_supported: bool,
    pub tracking: bool,
    pub tracking_status: TrackingStatus,
    pub hazards: usize,
    pub alert_active: bool,
}

/// Simple status response for liveness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// An unsupported positioning platform is reported as `degraded`; the
/// process itself keeps serving.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.lock().await;
    let source = session.location_source();

    let health = SessionHealth {
        session_id: session.session_id(),
        positioning_supported: source.is_supported(),
        tracking: source.is_tracking(),
        tracking_status: source.status(),
        hazards: session.hazards().len(),
        alert_active: session.active_alert().is_some(),
    };

    Json(HealthResponse {
        status: overall_status(&health).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        session: health,
    })
}

fn overall_status(health: &SessionHealth) -> &'static str {
    if health.positioning_supported {
        "healthy"
    } else {
        "degraded"
    }
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}
