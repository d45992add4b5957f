//! Report table endpoint.

use axum::extract::State;

use super::{success, ApiResult, AppQuery};
use crate::models::{ReportFilters, ReportView};
use crate::report;
use crate::AppState;

/// GET /api/reports - Flattened report rows.
///
/// Filters are forwarded to the rule service and applied again on the rows,
/// so a service that ignores them still yields a filtered table.
pub async fn list_report(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<ReportFilters>,
) -> ApiResult<ReportView> {
    let report = state.service.rules_report(&filters).await?;
    let rows = filters.apply(report::flatten(&report));

    tracing::debug!("Report with {} row(s) for {:?}", rows.len(), filters);

    success(ReportView {
        summary: report.summary,
        total_rows: rows.len(),
        rows,
    })
}
