//! Axum route handlers for the Version API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::editor::SessionView;
use crate::errors::AppError;
use crate::models::resume::{ResumeContent, StyleCustomization, TemplateId};
use crate::state::AppState;
use crate::versions::{ResumeVersion, SaveVersionOptions};

#[derive(Debug, Deserialize)]
pub struct SaveVersionRequest {
    /// Defaults to the open session's content, template and style.
    pub content: Option<ResumeContent>,
    pub label: Option<String>,
    pub template: Option<TemplateId>,
    pub style_customization: Option<StyleCustomization>,
    #[serde(default)]
    pub is_auto_save: bool,
}

#[derive(Debug, Deserialize)]
pub struct LabelUpdate {
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    pub keep_count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub removed: usize,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub a: Uuid,
    pub b: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub differences: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub version: ResumeVersion,
    /// Present when an editor session was open and received the version.
    pub session: Option<SessionView>,
}

fn version_not_found(version_id: Uuid) -> AppError {
    AppError::NotFound(format!("Version {version_id} not found"))
}

/// POST /api/v1/resumes/:id/versions
///
/// Auto-saves are followed by pruning down to AUTOSAVE_KEEP_COUNT.
pub async fn handle_save_version(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<SaveVersionRequest>,
) -> Result<Json<ResumeVersion>, AppError> {
    let SaveVersionRequest {
        content,
        label,
        mut template,
        mut style_customization,
        is_auto_save,
    } = request;

    let content = match content {
        Some(content) => content,
        None => {
            let sessions = state.sessions.read().await;
            let session = sessions.get(resume_id).ok_or_else(|| {
                AppError::Validation(
                    "content is required when no editor session is open".to_string(),
                )
            })?;
            template.get_or_insert_with(|| session.snapshot().template.clone());
            style_customization
                .get_or_insert_with(|| session.snapshot().style_customization.clone());
            session.content().clone()
        }
    };

    let options = SaveVersionOptions {
        label: label.filter(|l| !l.trim().is_empty()),
        template,
        style_customization,
        is_auto_save,
    };
    let version = state
        .versions
        .save_version(resume_id, content, options)
        .await?;

    if is_auto_save {
        state
            .versions
            .cleanup_auto_saves(resume_id, state.config.autosave_keep_count)
            .await?;
    }

    Ok(Json(version))
}

/// GET /api/v1/resumes/:id/versions
pub async fn handle_list_versions(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<Vec<ResumeVersion>>, AppError> {
    Ok(Json(state.versions.list_versions(resume_id).await?))
}

/// GET /api/v1/resumes/:id/versions/latest
pub async fn handle_latest_version(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeVersion>, AppError> {
    state
        .versions
        .latest_version(resume_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} has no versions")))
}

/// DELETE /api/v1/resumes/:id/versions
pub async fn handle_clear_versions(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.versions.clear_versions(resume_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/resumes/:id/versions/:version_id
pub async fn handle_update_label(
    State(state): State<AppState>,
    Path((resume_id, version_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<LabelUpdate>,
) -> Result<Json<ResumeVersion>, AppError> {
    state
        .versions
        .update_version_label(resume_id, version_id, request.label)
        .await?
        .map(Json)
        .ok_or_else(|| version_not_found(version_id))
}

/// DELETE /api/v1/resumes/:id/versions/:version_id
pub async fn handle_delete_version(
    State(state): State<AppState>,
    Path((resume_id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    if !state.versions.delete_version(resume_id, version_id).await? {
        return Err(version_not_found(version_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/versions/:version_id/restore
pub async fn handle_restore_version(
    State(state): State<AppState>,
    Path((resume_id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RestoreResponse>, AppError> {
    let version = state
        .versions
        .restore_version(resume_id, version_id)
        .await?
        .ok_or_else(|| version_not_found(version_id))?;

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .restore_version(resume_id, &version)
        .map(|session| session.view());
    info!(
        "Restored version {} of resume {resume_id} (session open: {})",
        version.version,
        session.is_some()
    );

    Ok(Json(RestoreResponse { version, session }))
}

/// POST /api/v1/resumes/:id/versions/cleanup
pub async fn handle_cleanup(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<CleanupRequest>,
) -> Result<Json<CleanupResponse>, AppError> {
    let keep_count = request
        .keep_count
        .unwrap_or(state.config.autosave_keep_count);
    let removed = state
        .versions
        .cleanup_auto_saves(resume_id, keep_count)
        .await?;
    Ok(Json(CleanupResponse { removed }))
}

/// GET /api/v1/resumes/:id/versions/compare?a=..&b=..
pub async fn handle_compare(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<CompareResponse>, AppError> {
    let differences = state
        .versions
        .compare_versions(resume_id, query.a, query.b)
        .await?
        .ok_or_else(|| AppError::NotFound("One or both versions not found".to_string()))?;
    Ok(Json(CompareResponse { differences }))
}
