//! Axum route handlers for profiles and resume profile links.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{
    Profile, ProfileContent, ProfileLink, ProfileOverrides, ProfileSelectionSet,
};
use crate::models::resume::ResumeContent;
use crate::profiles::merge_profile_content;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
    #[serde(default)]
    pub content: ProfileContent,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub content: Option<ProfileContent>,
}

/// Selection and overrides without the ids, which come from the path.
#[derive(Debug, Deserialize)]
pub struct LinkRules {
    #[serde(default)]
    pub selection: ProfileSelectionSet,
    #[serde(default)]
    pub overrides: ProfileOverrides,
}

impl LinkRules {
    fn into_link(self, profile_id: Uuid, resume_id: Uuid) -> ProfileLink {
        ProfileLink {
            selection: self.selection,
            overrides: self.overrides,
            ..ProfileLink::new(profile_id, resume_id)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub profile_id: Uuid,
    #[serde(flatten)]
    pub rules: LinkRules,
}

fn profile_not_found(profile_id: Uuid) -> AppError {
    AppError::NotFound(format!("Profile {profile_id} not found"))
}

/// POST /api/v1/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    let profile = state
        .profiles
        .create_profile(request.name, request.content)
        .await?;
    Ok(Json(profile))
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    state
        .profiles
        .get_profile(profile_id)
        .await?
        .map(Json)
        .ok_or_else(|| profile_not_found(profile_id))
}

/// PUT /api/v1/profiles/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    state
        .profiles
        .update_profile(profile_id, request.name, request.content)
        .await?
        .map(Json)
        .ok_or_else(|| profile_not_found(profile_id))
}

/// DELETE /api/v1/profiles/:id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.profiles.delete_profile(profile_id).await? {
        return Err(profile_not_found(profile_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/profiles/:id/preview
///
/// Merges the profile with ad-hoc rules without storing a link.
pub async fn handle_preview_merge(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(rules): Json<LinkRules>,
) -> Result<Json<ResumeContent>, AppError> {
    let profile = state
        .profiles
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| profile_not_found(profile_id))?;
    let link = rules.into_link(profile_id, Uuid::nil());
    Ok(Json(merge_profile_content(&profile, &link)))
}

/// PUT /api/v1/resumes/:id/profile-link
pub async fn handle_set_link(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<LinkRequest>,
) -> Result<Json<ProfileLink>, AppError> {
    let link = request.rules.into_link(request.profile_id, resume_id);
    if !state.profiles.set_link(&link).await? {
        return Err(profile_not_found(link.profile_id));
    }
    Ok(Json(link))
}

/// GET /api/v1/resumes/:id/profile-link
pub async fn handle_get_link(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ProfileLink>, AppError> {
    state
        .profiles
        .get_link(resume_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} is not linked to a profile")))
}

/// DELETE /api/v1/resumes/:id/profile-link
pub async fn handle_remove_link(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.profiles.remove_link(resume_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/merged-content
pub async fn handle_merged_content(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeContent>, AppError> {
    state
        .profiles
        .resolve(resume_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("Resume {resume_id} has no linked profile content"))
        })
}
