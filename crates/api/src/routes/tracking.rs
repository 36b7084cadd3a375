//! Location tracking endpoint handlers.

use axum::{extract::State, Json};
use domain::models::alert::ActiveAlertResponse;
use domain::models::location::{LocationStateResponse, PositionReport, ReportPositionResponse};
use tracing::{debug, info};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_alerts_triggered, record_position_report};

/// Current location source state.
///
/// GET /api/v1/location
pub async fn get_location(State(state): State<AppState>) -> Json<LocationStateResponse> {
    let session = state.session.lock().await;
    Json(session.location_source().state())
}

/// Accept a position completion from the device.
///
/// POST /api/v1/location/reports
///
/// The report answers the outstanding one-shot request (if any) and the
/// active watch. Responds 409 when tracking is not running.
pub async fn report_position(
    State(state): State<AppState>,
    Json(report): Json<PositionReport>,
) -> Result<Json<ReportPositionResponse>, ApiError> {
    if let PositionReport::Fix(fix) = &report {
        fix.validate()?;
    }

    let status = report.status_str();
    let mut session = state.session.lock().await;

    if !session.location_source().is_tracking() {
        return Err(ApiError::Conflict(
            "Location tracking is not running".to_string(),
        ));
    }

    record_position_report(status);
    let triggered_before = session.proximity().alerts_triggered();

    let updates = session
        .location_source_mut()
        .provider_mut()
        .route(report.into_result());

    let mut applied = false;
    for update in updates {
        applied |= session.on_position(update).is_some();
    }

    record_alerts_triggered(session.proximity().alerts_triggered() - triggered_before);
    debug!(status, applied, "Position report processed");

    Ok(Json(ReportPositionResponse {
        applied,
        state: session.location_source().state(),
        alert: session.active_alert().map(ActiveAlertResponse::from),
    }))
}

/// Start tracking. Restarts the subscription if one is already open.
///
/// POST /api/v1/tracking/start
pub async fn start_tracking(State(state): State<AppState>) -> Json<LocationStateResponse> {
    let mut session = state.session.lock().await;
    session.start_tracking();
    Json(session.location_source().state())
}

/// Stop tracking. The last sample and any active alert are kept.
///
/// POST /api/v1/tracking/stop
pub async fn stop_tracking(State(state): State<AppState>) -> Json<LocationStateResponse> {
    let mut session = state.session.lock().await;
    session.stop_tracking();
    Json(session.location_source().state())
}

/// Stop, clear acknowledgements, start again.
///
/// POST /api/v1/tracking/restart
pub async fn restart_tracking(State(state): State<AppState>) -> Json<LocationStateResponse> {
    let mut session = state.session.lock().await;
    let triggered_before = session.proximity().alerts_triggered();

    let outcome = session.restart_tracking();
    info!(session_id = %session.session_id(), ?outcome, "Tracking restarted");

    record_alerts_triggered(session.proximity().alerts_triggered() - triggered_before);
    Json(session.location_source().state())
}
