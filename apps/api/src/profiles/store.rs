use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::profile::{Profile, ProfileContent, ProfileLink};
use crate::models::resume::ResumeContent;
use crate::profiles::merge::merge_profile_content;
use crate::storage::{load_json, store_json, KeyValueStorage, StorageError};

fn profile_key(profile_id: Uuid) -> String {
    format!("profiles:{profile_id}")
}

fn link_key(resume_id: Uuid) -> String {
    format!("profile-links:{resume_id}")
}

/// Profiles and the resume links that project from them.
pub struct ProfileStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl ProfileStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub async fn create_profile(
        &self,
        name: String,
        content: ProfileContent,
    ) -> Result<Profile, StorageError> {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            name,
            content,
            created_at: now,
            updated_at: now,
        };
        store_json(self.storage.as_ref(), &profile_key(profile.id), &profile).await?;
        info!("Created profile {}", profile.id);
        Ok(profile)
    }

    pub async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, StorageError> {
        load_json(self.storage.as_ref(), &profile_key(profile_id)).await
    }

    pub async fn update_profile(
        &self,
        profile_id: Uuid,
        name: Option<String>,
        content: Option<ProfileContent>,
    ) -> Result<Option<Profile>, StorageError> {
        let Some(mut profile) = self.get_profile(profile_id).await? else {
            return Ok(None);
        };
        if let Some(name) = name {
            profile.name = name;
        }
        if let Some(content) = content {
            profile.content = content;
        }
        profile.updated_at = Utc::now();
        store_json(self.storage.as_ref(), &profile_key(profile_id), &profile).await?;
        Ok(Some(profile))
    }

    pub async fn delete_profile(&self, profile_id: Uuid) -> Result<bool, StorageError> {
        if self.get_profile(profile_id).await?.is_none() {
            return Ok(false);
        }
        self.storage.remove_item(&profile_key(profile_id)).await?;
        info!("Deleted profile {profile_id}");
        Ok(true)
    }

    /// Links a resume to a profile. Returns `false` if the profile does not exist.
    pub async fn set_link(&self, link: &ProfileLink) -> Result<bool, StorageError> {
        if self.get_profile(link.profile_id).await?.is_none() {
            return Ok(false);
        }
        store_json(self.storage.as_ref(), &link_key(link.resume_id), link).await?;
        Ok(true)
    }

    pub async fn get_link(&self, resume_id: Uuid) -> Result<Option<ProfileLink>, StorageError> {
        load_json(self.storage.as_ref(), &link_key(resume_id)).await
    }

    pub async fn remove_link(&self, resume_id: Uuid) -> Result<(), StorageError> {
        self.storage.remove_item(&link_key(resume_id)).await
    }

    /// Merged content for a linked resume; `None` when the resume has no link
    /// or the linked profile is gone.
    pub async fn resolve(&self, resume_id: Uuid) -> Result<Option<ResumeContent>, StorageError> {
        let Some(link) = self.get_link(resume_id).await? else {
            return Ok(None);
        };
        let Some(profile) = self.get_profile(link.profile_id).await? else {
            return Ok(None);
        };
        Ok(Some(merge_profile_content(&profile, &link)))
    }
}
