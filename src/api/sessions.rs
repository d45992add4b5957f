//! Edit session endpoints.

use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{success, ApiResult, AppJson};
use crate::errors::AppError;
use crate::models::{SetDaysRequest, SetRuleRequest};
use crate::reconcile::{EditSession, Notice, SaveReport, SessionView};
use crate::sessions::SessionHandle;
use crate::AppState;

/// A session with its merged view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub view: SessionView,
}

impl SessionResponse {
    fn new(handle: &SessionHandle, session: &EditSession) -> Self {
        Self {
            id: handle.id,
            created_at: handle.created_at,
            view: session.view(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    #[serde(flatten)]
    pub report: SaveReport,
    pub notices: Vec<Notice>,
    pub session: SessionResponse,
}

async fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    let not_found = || AppError::NotFound(format!("Edit session {} not found", id));
    let uuid = Uuid::parse_str(id).map_err(|_| not_found())?;
    state.sessions.get(&uuid).await.ok_or_else(not_found)
}

/// POST /api/edit-sessions - Start a session over the current tree.
pub async fn create_session(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let tree = state.service.list_classes().await?;
    if tree.is_empty() {
        tracing::warn!("Starting an edit session over an empty hierarchy");
    }
    let handle = state.sessions.create(tree).await;
    let session = handle.session.lock().await;

    tracing::info!(
        "Started edit session {} ({} active)",
        handle.id,
        state.sessions.len().await
    );
    success(SessionResponse::new(&handle, &session))
}

/// GET /api/edit-sessions/{id} - The tree merged with pending edits.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionResponse> {
    let handle = find_session(&state, &id).await?;
    let session = handle.session.lock().await;
    success(SessionResponse::new(&handle, &session))
}

/// DELETE /api/edit-sessions/{id} - Abandon a session and its edits.
pub async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.session.lock().await;
    let dropped = session.pending_count();
    session.abandon();
    state.sessions.remove(&handle.id).await;

    tracing::info!("Abandoned edit session {} with {} pending edit(s)", handle.id, dropped);
    success(())
}

/// PUT /api/edit-sessions/{id}/entities/{entityId}/rule - Propose a rule.
pub async fn set_entity_rule(
    State(state): State<AppState>,
    Path((id, entity_id)): Path<(String, String)>,
    AppJson(request): AppJson<SetRuleRequest>,
) -> ApiResult<SessionResponse> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.session.lock().await;
    session.set_rule(&entity_id, request.rule)?;
    success(SessionResponse::new(&handle, &session))
}

/// PUT /api/edit-sessions/{id}/entities/{entityId}/days - Type a day count.
///
/// Invalid text is accepted and kept; it just does not change the edit.
pub async fn set_entity_days(
    State(state): State<AppState>,
    Path((id, entity_id)): Path<(String, String)>,
    AppJson(request): AppJson<SetDaysRequest>,
) -> ApiResult<SessionResponse> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.session.lock().await;
    session.set_days(&entity_id, request.days.into_text())?;
    success(SessionResponse::new(&handle, &session))
}

/// DELETE /api/edit-sessions/{id}/entities/{entityId} - Discard one edit.
pub async fn discard_entity_edit(
    State(state): State<AppState>,
    Path((id, entity_id)): Path<(String, String)>,
) -> ApiResult<SessionResponse> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.session.lock().await;
    if !session.discard(&entity_id) {
        tracing::debug!("No edit to discard for {} in session {}", entity_id, handle.id);
    }
    success(SessionResponse::new(&handle, &session))
}

/// POST /api/edit-sessions/{id}/save - Persist every pending edit.
pub async fn save_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SaveResponse> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.session.lock().await;

    let report = session.save(state.service.clone()).await?;
    tracing::info!(
        "Session {} saved {} edit(s), {} failed",
        handle.id,
        report.saved,
        report.failures.len()
    );

    success(SaveResponse {
        notices: report.notices(),
        report,
        session: SessionResponse::new(&handle, &session),
    })
}
