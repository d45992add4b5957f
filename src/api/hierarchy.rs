//! Hierarchy and service status endpoints.

use axum::extract::{Path, State};
use serde::Serialize;

use super::{success, ApiResult};
use crate::models::{DocumentClass, Hierarchy};
use crate::upstream::ServiceStatus;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub service: ServiceStatus,
    pub upstream_timeout_secs: u64,
}

/// GET /api/status - Rule service mode and availability.
pub async fn get_status(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    success(StatusResponse {
        service: state.service.status().await,
        upstream_timeout_secs: state.config.upstream_timeout.as_secs(),
    })
}

/// GET /api/document-classes - The full hierarchy.
pub async fn list_document_classes(State(state): State<AppState>) -> ApiResult<Hierarchy> {
    let tree = state.service.list_classes().await?;
    success(tree)
}

/// GET /api/document-classes/{id} - One class with its types and labels.
pub async fn get_document_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DocumentClass> {
    let class = state.service.get_class(&id).await?;
    success(class)
}
