//! Active alert endpoint handlers.

use axum::{extract::State, Json};
use domain::models::alert::{AcknowledgeAlertResponse, ActiveAlertResponse, CurrentAlertResponse};
use tracing::debug;

use crate::app::AppState;
use crate::middleware::metrics::record_alerts_triggered;

/// The alert currently shown, if any.
///
/// GET /api/v1/alert
pub async fn get_alert(State(state): State<AppState>) -> Json<CurrentAlertResponse> {
    let session = state.session.lock().await;
    Json(CurrentAlertResponse {
        alert: session.active_alert().map(ActiveAlertResponse::from),
    })
}

/// Dismiss the active alert.
///
/// POST /api/v1/alert/acknowledge
///
/// A no-op when nothing is active. The next qualifying hazard, if any, is
/// returned as the new alert.
pub async fn acknowledge_alert(State(state): State<AppState>) -> Json<AcknowledgeAlertResponse> {
    let mut session = state.session.lock().await;
    let triggered_before = session.proximity().alerts_triggered();

    let acknowledged = session.acknowledge();
    if acknowledged.is_none() {
        debug!("Acknowledge requested with no active alert");
    }
    record_alerts_triggered(session.proximity().alerts_triggered() - triggered_before);

    Json(AcknowledgeAlertResponse {
        acknowledged_hazard_id: acknowledged,
        acknowledged_count: session.proximity().acknowledged().len(),
        alert: session.active_alert().map(ActiveAlertResponse::from),
    })
}

/// Forget every acknowledgement so those hazards can alert again.
///
/// DELETE /api/v1/alert/acknowledgements
pub async fn reset_acknowledgements(State(state): State<AppState>) -> Json<CurrentAlertResponse> {
    let mut session = state.session.lock().await;
    let triggered_before = session.proximity().alerts_triggered();

    session.reset_acknowledgements();
    record_alerts_triggered(session.proximity().alerts_triggered() - triggered_before);

    Json(CurrentAlertResponse {
        alert: session.active_alert().map(ActiveAlertResponse::from),
    })
}
