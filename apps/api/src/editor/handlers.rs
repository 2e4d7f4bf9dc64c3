//! Axum route handlers for editor sessions, undo/redo and the history panel.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::editor::history::{HistoryEntry, ResumeHistory};
use crate::editor::session::{EditorSession, SessionView};
use crate::editor::snapshot::{ChangeType, GlobalStateSnapshot};
use crate::editor::undo::UndoEntry;
use crate::errors::AppError;
use crate::models::resume::{
    JobInfoDraft, PersonalInfoDraft, ResumeContent, StyleCustomization, TemplateId,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub state: GlobalStateSnapshot,
    /// Falls back to the linked profile's merged content, then to empty content.
    pub content: Option<ResumeContent>,
}

#[derive(Debug, Deserialize)]
pub struct TemplateUpdate {
    pub template: TemplateId,
}

#[derive(Debug, Deserialize)]
pub struct ContentUpdate {
    pub content: ResumeContent,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub change_type: Option<ChangeType>,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct ContentUpdateResponse {
    pub history_entry: Option<HistoryEntry>,
    pub session: SessionView,
}

/// `applied` is false when there was nothing to undo or redo.
#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub applied: bool,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct UndoStackResponse {
    pub entries: Vec<UndoEntry>,
    pub current_index: Option<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Sessions
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/:id/session
pub async fn handle_open_session(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let content = match request.content {
        Some(content) => content,
        None => state
            .profiles
            .resolve(resume_id)
            .await?
            .unwrap_or_default(),
    };
    let mut sessions = state.sessions.write().await;
    let session = sessions.open(resume_id, request.state, content);
    Ok(Json(session.view()))
}

/// GET /api/v1/resumes/:id/session
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(resume_id)
        .ok_or_else(|| AppError::session_not_found(resume_id))?;
    Ok(Json(session.view()))
}

/// DELETE /api/v1/resumes/:id/session
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.write().await.close(resume_id) {
        return Err(AppError::session_not_found(resume_id));
    }
    info!("Closed editor session for resume {resume_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Runs one edit against an open session and returns the resulting view.
async fn edit_session(
    state: &AppState,
    resume_id: Uuid,
    edit: impl FnOnce(&mut EditorSession) -> Option<ChangeType>,
) -> Result<Json<ChangeResponse>, AppError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(resume_id)
        .ok_or_else(|| AppError::session_not_found(resume_id))?;
    let change_type = edit(session);
    Ok(Json(ChangeResponse {
        change_type,
        session: session.view(),
    }))
}

/// PUT /api/v1/resumes/:id/session/template
pub async fn handle_set_template(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<TemplateUpdate>,
) -> Result<Json<ChangeResponse>, AppError> {
    if request.template.0.trim().is_empty() {
        return Err(AppError::Validation("template cannot be empty".to_string()));
    }
    edit_session(&state, resume_id, |s| s.set_template(request.template)).await
}

/// PUT /api/v1/resumes/:id/session/style
pub async fn handle_set_style(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(style): Json<StyleCustomization>,
) -> Result<Json<ChangeResponse>, AppError> {
    edit_session(&state, resume_id, |s| s.set_style(style)).await
}

/// PUT /api/v1/resumes/:id/session/user-info
pub async fn handle_set_user_info(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(user_info): Json<PersonalInfoDraft>,
) -> Result<Json<ChangeResponse>, AppError> {
    edit_session(&state, resume_id, |s| s.set_user_info(user_info)).await
}

/// PUT /api/v1/resumes/:id/session/job-info
pub async fn handle_set_job_info(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(job_info): Json<JobInfoDraft>,
) -> Result<Json<ChangeResponse>, AppError> {
    edit_session(&state, resume_id, |s| s.set_job_info(job_info)).await
}

/// PUT /api/v1/resumes/:id/session/state
///
/// Replaces template, style, personal and job info in one edit.
pub async fn handle_set_state(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(snapshot): Json<GlobalStateSnapshot>,
) -> Result<Json<ChangeResponse>, AppError> {
    edit_session(&state, resume_id, |s| s.apply_bulk(snapshot)).await
}

/// PUT /api/v1/resumes/:id/session/content
pub async fn handle_update_content(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<ContentUpdate>,
) -> Result<Json<ContentUpdateResponse>, AppError> {
    let mut sessions = state.sessions.write().await;
    if sessions.get(resume_id).is_none() {
        return Err(AppError::session_not_found(resume_id));
    }
    let description = request
        .description
        .unwrap_or_else(|| "Edited resume content".to_string());
    let history_entry = sessions.update_content(resume_id, request.content, &description);
    if let Some(entry) = &history_entry {
        info!(
            "Recorded {} field changes for resume {resume_id} ({} history entries)",
            entry.changes.len(),
            sessions.history().entries(resume_id).len()
        );
    }
    let session = sessions
        .get(resume_id)
        .ok_or_else(|| AppError::session_not_found(resume_id))?;
    Ok(Json(ContentUpdateResponse {
        history_entry,
        session: session.view(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Undo / redo
// ────────────────────────────────────────────────────────────────────────────

async fn navigate(
    state: &AppState,
    resume_id: Uuid,
    step: impl FnOnce(&mut EditorSession) -> bool,
) -> Result<Json<NavigationResponse>, AppError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(resume_id)
        .ok_or_else(|| AppError::session_not_found(resume_id))?;
    let applied = step(session);
    Ok(Json(NavigationResponse {
        applied,
        session: session.view(),
    }))
}

/// POST /api/v1/resumes/:id/session/undo
pub async fn handle_undo(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, AppError> {
    navigate(&state, resume_id, EditorSession::undo).await
}

/// POST /api/v1/resumes/:id/session/redo
pub async fn handle_redo(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, AppError> {
    navigate(&state, resume_id, EditorSession::redo).await
}

/// POST /api/v1/resumes/:id/session/undo-stack/:index/jump
pub async fn handle_jump(
    State(state): State<AppState>,
    Path((resume_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<NavigationResponse>, AppError> {
    navigate(&state, resume_id, |s| s.jump_to(index)).await
}

/// GET /api/v1/resumes/:id/session/undo-stack
pub async fn handle_undo_stack(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<UndoStackResponse>, AppError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(resume_id)
        .ok_or_else(|| AppError::session_not_found(resume_id))?;
    let view = session.view();
    Ok(Json(UndoStackResponse {
        entries: session.undo_entries().to_vec(),
        current_index: view.current_index,
        can_undo: view.can_undo,
        can_redo: view.can_redo,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// History panel
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes/:id/history
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Json<ResumeHistory> {
    let sessions = state.sessions.read().await;
    Json(
        sessions
            .history()
            .history(resume_id)
            .cloned()
            .unwrap_or_default(),
    )
}

/// DELETE /api/v1/resumes/:id/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> StatusCode {
    state.sessions.write().await.history_mut().clear(resume_id);
    StatusCode::NO_CONTENT
}

/// POST /api/v1/resumes/:id/history/:index/select
pub async fn handle_select_history(
    State(state): State<AppState>,
    Path((resume_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<HistoryEntry>, AppError> {
    let mut sessions = state.sessions.write().await;
    sessions
        .history_mut()
        .go_to(resume_id, index)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("History entry {index} not found")))
}
