//! Hazard snapshot endpoint handlers.

use axum::{extract::State, Json};
use domain::models::alert::{ActiveAlertResponse, ReplaceHazardsResponse};
use domain::models::hazard::{
    HazardResponse, HazardSnapshot, ListHazardsResponse, ReplaceHazardsRequest,
};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_alerts_triggered, record_hazard_snapshot};

/// Replace the full hazard list.
///
/// PUT /api/v1/hazards
///
/// Rows keep the store's order. Malformed rows are skipped and counted;
/// the rest of the snapshot still applies.
pub async fn replace_hazards(
    State(state): State<AppState>,
    Json(request): Json<ReplaceHazardsRequest>,
) -> Result<Json<ReplaceHazardsResponse>, ApiError> {
    let limit = state.config.limits.max_hazards_per_snapshot;
    if request.hazards.len() > limit {
        return Err(ApiError::Validation(format!(
            "Snapshot has {} hazards, maximum is {}",
            request.hazards.len(),
            limit
        )));
    }

    let snapshot = HazardSnapshot::parse(request.hazards);
    let accepted = snapshot.hazards.len();
    let skipped = snapshot.skipped;

    let mut session = state.session.lock().await;
    let triggered_before = session.proximity().alerts_triggered();
    let outcome = session.on_hazards(snapshot.hazards);

    record_hazard_snapshot(accepted, skipped);
    record_alerts_triggered(session.proximity().alerts_triggered() - triggered_before);
    info!(accepted, skipped, ?outcome, "Hazard snapshot applied");

    Ok(Json(ReplaceHazardsResponse {
        accepted,
        skipped,
        alert: session.active_alert().map(ActiveAlertResponse::from),
    }))
}

/// Current hazard snapshot in store order.
///
/// GET /api/v1/hazards
pub async fn list_hazards(State(state): State<AppState>) -> Json<ListHazardsResponse> {
    let session = state.session.lock().await;
    let hazards: Vec<HazardResponse> = session.hazards().iter().map(HazardResponse::from).collect();

    Json(ListHazardsResponse {
        total: hazards.len(),
        hazards,
    })
}
