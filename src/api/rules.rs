//! Immediate rule updates, outside any edit session.

use axum::extract::{Path, State};

use super::{success, ApiResult, AppJson};
use crate::errors::AppError;
use crate::models::{Hierarchy, Level, UpdateRuleRequest};
use crate::AppState;

/// PUT /api/rules/{level}/{id} - Save one entity's rule and return the
/// reloaded hierarchy.
pub async fn update_rule(
    State(state): State<AppState>,
    Path((level, id)): Path<(String, String)>,
    AppJson(request): AppJson<UpdateRuleRequest>,
) -> ApiResult<Hierarchy> {
    let level = Level::parse(&level)
        .ok_or_else(|| AppError::NotFound(format!("Unknown level {}", level)))?;
    let assignment = request.into_assignment().map_err(AppError::Validation)?;

    state.service.update_rule(level, &id, assignment).await?;
    tracing::info!("Updated {} {} to {}", level, id, assignment.rule.as_str());

    let tree = state.service.list_classes().await?;
    success(tree)
}
