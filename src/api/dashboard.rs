//! Dashboard endpoints. Every call reloads the tree and recomputes.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::aggregate::{self, Alert, Distribution, Overview};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    /// No alert fired.
    pub all_clear: bool,
}

/// GET /api/dashboard/overview - Counts, rule percentages and coverage.
pub async fn get_overview(State(state): State<AppState>) -> ApiResult<Overview> {
    let tree = state.service.list_classes().await?;
    success(aggregate::overview(&tree))
}

/// GET /api/dashboard/alerts - Alerts derived from the tree.
pub async fn get_alerts(State(state): State<AppState>) -> ApiResult<AlertsResponse> {
    let tree = state.service.list_classes().await?;
    let alerts = aggregate::compute_alerts(&tree);

    success(AlertsResponse {
        all_clear: alerts.is_empty(),
        alerts,
    })
}

/// GET /api/dashboard/distribution - Rule slices and per-level breakdown.
pub async fn get_distribution(State(state): State<AppState>) -> ApiResult<Distribution> {
    let tree = state.service.list_classes().await?;
    success(aggregate::distribution(&tree))
}
