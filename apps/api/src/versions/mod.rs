//! Version store: named and auto-saved snapshots of full resume content.
//!
//! Independent of the undo timeline. Each resume has its own version list
//! persisted under `versions:{resume_id}`; version numbers only ever grow,
//! even after deletes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::resume::{ResumeContent, StyleCustomization, TemplateId};
use crate::storage::{load_json, store_json, KeyValueStorage, StorageError};

pub mod handlers;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeVersion {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub version: u32,
    pub content: ResumeContent,
    pub label: Option<String>,
    pub template: Option<TemplateId>,
    pub style_customization: Option<StyleCustomization>,
    pub is_auto_save: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaveVersionOptions {
    pub label: Option<String>,
    pub template: Option<TemplateId>,
    pub style_customization: Option<StyleCustomization>,
    pub is_auto_save: bool,
}

/// All versions of one resume, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeVersions {
    last_version: u32,
    versions: Vec<ResumeVersion>,
}

impl ResumeVersions {
    pub fn versions(&self) -> &[ResumeVersion] {
        &self.versions
    }

    pub fn save(
        &mut self,
        resume_id: Uuid,
        content: ResumeContent,
        options: SaveVersionOptions,
    ) -> ResumeVersion {
        self.last_version += 1;
        let version = ResumeVersion {
            id: Uuid::new_v4(),
            resume_id,
            version: self.last_version,
            content,
            label: options.label,
            template: options.template,
            style_customization: options.style_customization,
            is_auto_save: options.is_auto_save,
            created_at: Utc::now(),
        };
        self.versions.push(version.clone());
        version
    }

    pub fn find(&self, version_id: Uuid) -> Option<&ResumeVersion> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    pub fn latest(&self) -> Option<&ResumeVersion> {
        self.versions.iter().max_by_key(|v| v.version)
    }

    pub fn delete(&mut self, version_id: Uuid) -> bool {
        let before = self.versions.len();
        self.versions.retain(|v| v.id != version_id);
        self.versions.len() != before
    }

    pub fn update_label(&mut self, version_id: Uuid, label: Option<String>) -> Option<&ResumeVersion> {
        let version = self.versions.iter_mut().find(|v| v.id == version_id)?;
        version.label = label;
        Some(version)
    }

    /// Keeps the `keep_count` newest auto-saves; manual versions always stay.
    /// Returns how many versions were removed.
    pub fn cleanup_auto_saves(&mut self, keep_count: usize) -> usize {
        let mut auto_saves: Vec<u32> = self
            .versions
            .iter()
            .filter(|v| v.is_auto_save)
            .map(|v| v.version)
            .collect();
        if auto_saves.len() <= keep_count {
            return 0;
        }
        auto_saves.sort_unstable_by(|a, b| b.cmp(a));
        let cutoff = auto_saves[keep_count];

        let before = self.versions.len();
        self.versions
            .retain(|v| !v.is_auto_save || v.version > cutoff);
        before - self.versions.len()
    }

    /// Human-readable list of the sections that differ between two versions.
    pub fn compare(&self, first: Uuid, second: Uuid) -> Option<Vec<String>> {
        let a = self.find(first)?;
        let b = self.find(second)?;
        Some(describe_differences(a, b))
    }
}

fn describe_differences(a: &ResumeVersion, b: &ResumeVersion) -> Vec<String> {
    let (old, new) = (&a.content, &b.content);
    let mut differences = Vec::new();

    if old.personal_info != new.personal_info {
        differences.push("Personal info changed".to_string());
    }
    if old.experience.len() != new.experience.len() {
        let delta = new.experience.len() as i64 - old.experience.len() as i64;
        differences.push(format!(
            "Experience: {} → {} entries ({delta:+})",
            old.experience.len(),
            new.experience.len()
        ));
    } else if old.experience != new.experience {
        differences.push("Experience entries changed".to_string());
    }
    if old.education != new.education {
        differences.push("Education changed".to_string());
    }
    if old.skills != new.skills {
        differences.push("Skills changed".to_string());
    }
    if old.certifications != new.certifications {
        differences.push("Certifications changed".to_string());
    }
    if old.links != new.links {
        differences.push("Links changed".to_string());
    }
    if a.template != b.template {
        let name = |t: &Option<TemplateId>| {
            t.as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "none".to_string())
        };
        differences.push(format!("Template: {} → {}", name(&a.template), name(&b.template)));
    }
    differences
}

// ────────────────────────────────────────────────────────────────────────────
// Persistent store
// ────────────────────────────────────────────────────────────────────────────

/// Version lists read from and written to storage on every call.
///
/// Storage is the only copy, so several processes sharing one backend see
/// each other's saves. `write_lock` serializes read-modify-write cycles
/// within this process; across processes the last write wins.
pub struct VersionStore {
    storage: Arc<dyn KeyValueStorage>,
    write_lock: Mutex<()>,
}

fn storage_key(resume_id: Uuid) -> String {
    format!("versions:{resume_id}")
}

impl VersionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the resume's versions, runs `f` on them and persists the result
    /// if `f` reports a change. Nothing is kept when the write fails.
    async fn with_versions<R>(
        &self,
        resume_id: Uuid,
        f: impl FnOnce(&mut ResumeVersions) -> (R, bool),
    ) -> Result<R, StorageError> {
        let _guard = self.write_lock.lock().await;
        let key = storage_key(resume_id);
        let mut versions: ResumeVersions = load_json(self.storage.as_ref(), &key).await?;
        debug!(
            "Loaded {} versions for resume {resume_id}",
            versions.versions.len()
        );

        let (result, changed) = f(&mut versions);
        if changed {
            store_json(self.storage.as_ref(), &key, &versions).await?;
        }
        Ok(result)
    }

    pub async fn save_version(
        &self,
        resume_id: Uuid,
        content: ResumeContent,
        options: SaveVersionOptions,
    ) -> Result<ResumeVersion, StorageError> {
        let version = self
            .with_versions(resume_id, |v| (v.save(resume_id, content, options), true))
            .await?;
        info!(
            "Saved version {} for resume {resume_id} (auto_save: {})",
            version.version, version.is_auto_save
        );
        Ok(version)
    }

    /// Looks up a version to restore. Applying it is up to the caller.
    pub async fn restore_version(
        &self,
        resume_id: Uuid,
        version_id: Uuid,
    ) -> Result<Option<ResumeVersion>, StorageError> {
        self.with_versions(resume_id, |v| (v.find(version_id).cloned(), false))
            .await
    }

    pub async fn list_versions(&self, resume_id: Uuid) -> Result<Vec<ResumeVersion>, StorageError> {
        self.with_versions(resume_id, |v| (v.versions().to_vec(), false))
            .await
    }

    pub async fn latest_version(
        &self,
        resume_id: Uuid,
    ) -> Result<Option<ResumeVersion>, StorageError> {
        self.with_versions(resume_id, |v| (v.latest().cloned(), false))
            .await
    }

    pub async fn delete_version(&self, resume_id: Uuid, version_id: Uuid) -> Result<bool, StorageError> {
        self.with_versions(resume_id, |v| {
            let deleted = v.delete(version_id);
            (deleted, deleted)
        })
        .await
    }

    pub async fn update_version_label(
        &self,
        resume_id: Uuid,
        version_id: Uuid,
        label: Option<String>,
    ) -> Result<Option<ResumeVersion>, StorageError> {
        self.with_versions(resume_id, |v| {
            let updated = v.update_label(version_id, label).cloned();
            let changed = updated.is_some();
            (updated, changed)
        })
        .await
    }

    pub async fn clear_versions(&self, resume_id: Uuid) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.storage.remove_item(&storage_key(resume_id)).await?;
        info!("Cleared all versions for resume {resume_id}");
        Ok(())
    }

    pub async fn cleanup_auto_saves(
        &self,
        resume_id: Uuid,
        keep_count: usize,
    ) -> Result<usize, StorageError> {
        let removed = self
            .with_versions(resume_id, |v| {
                let removed = v.cleanup_auto_saves(keep_count);
                (removed, removed > 0)
            })
            .await?;
        if removed > 0 {
            debug!("Pruned {removed} auto-saves for resume {resume_id}");
        }
        Ok(removed)
    }

    pub async fn compare_versions(
        &self,
        resume_id: Uuid,
        first: Uuid,
        second: Uuid,
    ) -> Result<Option<Vec<String>>, StorageError> {
        self.with_versions(resume_id, |v| (v.compare(first, second), false))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ExperienceItem;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    /// Reads succeed, every write fails.
    struct ReadOnlyStorage;

    #[async_trait]
    impl KeyValueStorage for ReadOnlyStorage {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set_item(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::S3("write rejected".to_string()))
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::S3("write rejected".to_string()))
        }
    }

    fn auto() -> SaveVersionOptions {
        SaveVersionOptions {
            is_auto_save: true,
            ..Default::default()
        }
    }

    fn manual(label: &str) -> SaveVersionOptions {
        SaveVersionOptions {
            label: Some(label.to_string()),
            ..Default::default()
        }
    }

    fn experience(company: &str) -> ExperienceItem {
        ExperienceItem {
            id: Uuid::new_v4(),
            company: company.to_string(),
            position: "Engineer".to_string(),
            start_date: None,
            end_date: None,
            location: None,
            highlights: vec![],
        }
    }

    #[test]
    fn test_version_numbers_increase_per_resume() {
        let mut versions = ResumeVersions::default();
        let resume = Uuid::new_v4();
        let first = versions.save(resume, ResumeContent::default(), manual("one"));
        let second = versions.save(resume, ResumeContent::default(), auto());
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);

        versions.delete(second.id);
        let third = versions.save(resume, ResumeContent::default(), auto());
        assert_eq!(third.version, 3);
    }

    #[test]
    fn test_cleanup_keeps_manual_versions() {
        let mut versions = ResumeVersions::default();
        let resume = Uuid::new_v4();
        for i in 0..8 {
            let options = if i % 3 == 0 { manual("m") } else { auto() };
            versions.save(resume, ResumeContent::default(), options);
        }
        // 3 manual (0, 3, 6) and 5 auto-saves.
        assert_eq!(versions.versions().len(), 8);
        let removed = versions.cleanup_auto_saves(2);
        assert_eq!(removed, 3);
        assert_eq!(versions.versions().len(), 5);
        assert_eq!(versions.versions().iter().filter(|v| v.is_auto_save).count(), 2);
        assert_eq!(versions.versions().iter().filter(|v| !v.is_auto_save).count(), 3);
    }

    #[test]
    fn test_cleanup_under_limit_is_noop() {
        let mut versions = ResumeVersions::default();
        versions.save(Uuid::new_v4(), ResumeContent::default(), auto());
        assert_eq!(versions.cleanup_auto_saves(10), 0);
        assert_eq!(versions.versions().len(), 1);
    }

    #[test]
    fn test_compare_reports_sections() {
        let mut versions = ResumeVersions::default();
        let resume = Uuid::new_v4();
        let a = versions.save(
            resume,
            ResumeContent {
                experience: vec![experience("Acme")],
                ..Default::default()
            },
            SaveVersionOptions {
                template: Some(TemplateId::from("modern")),
                ..Default::default()
            },
        );
        let mut content = ResumeContent {
            experience: vec![experience("Acme"), experience("Globex"), experience("Initech")],
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        content.personal_info.full_name = "Ada".to_string();
        let b = versions.save(
            resume,
            content,
            SaveVersionOptions {
                template: Some(TemplateId::from("classic")),
                ..Default::default()
            },
        );

        let diff = versions.compare(a.id, b.id).unwrap();
        assert_eq!(
            diff,
            vec![
                "Personal info changed".to_string(),
                "Experience: 1 → 3 entries (+2)".to_string(),
                "Skills changed".to_string(),
                "Template: modern → classic".to_string(),
            ]
        );
        assert!(versions.compare(a.id, Uuid::new_v4()).is_none());
        assert!(versions.compare(a.id, a.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fifteen_auto_saves_keep_ten_newest() {
        let store = VersionStore::new(Arc::new(MemoryStorage::new()));
        let resume = Uuid::new_v4();
        for _ in 0..15 {
            store
                .save_version(resume, ResumeContent::default(), auto())
                .await
                .unwrap();
        }
        let removed = store.cleanup_auto_saves(resume, 10).await.unwrap();
        assert_eq!(removed, 5);

        let remaining: Vec<u32> = store
            .list_versions(resume)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(remaining, (6..=15).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_restore_missing_version_is_none() {
        let store = VersionStore::new(Arc::new(MemoryStorage::new()));
        let found = store
            .restore_version(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_versions_survive_a_new_store_instance() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let resume = Uuid::new_v4();
        let mut content = ResumeContent::default();
        content.skills = vec!["Rust".to_string()];

        let saved = VersionStore::new(storage.clone())
            .save_version(resume, content.clone(), manual("Before interview"))
            .await
            .unwrap();

        let reopened = VersionStore::new(storage);
        let restored = reopened
            .restore_version(resume, saved.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.content, content);
        assert_eq!(restored.label.as_deref(), Some("Before interview"));
    }

    #[tokio::test]
    async fn test_label_update_delete_and_clear() {
        let store = VersionStore::new(Arc::new(MemoryStorage::new()));
        let resume = Uuid::new_v4();
        let other = Uuid::new_v4();
        let v = store
            .save_version(resume, ResumeContent::default(), manual("draft"))
            .await
            .unwrap();
        store
            .save_version(other, ResumeContent::default(), manual("other"))
            .await
            .unwrap();

        let renamed = store
            .update_version_label(resume, v.id, Some("final".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.label.as_deref(), Some("final"));
        assert!(store
            .update_version_label(resume, Uuid::new_v4(), None)
            .await
            .unwrap()
            .is_none());

        assert!(store.delete_version(resume, v.id).await.unwrap());
        assert!(!store.delete_version(resume, v.id).await.unwrap());

        store.save_version(resume, ResumeContent::default(), auto()).await.unwrap();
        store.clear_versions(resume).await.unwrap();
        assert!(store.list_versions(resume).await.unwrap().is_empty());
        // Other resumes are untouched.
        assert_eq!(store.list_versions(other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_no_version_behind() {
        let store = VersionStore::new(Arc::new(ReadOnlyStorage));
        let resume = Uuid::new_v4();
        assert!(store
            .save_version(resume, ResumeContent::default(), manual("lost"))
            .await
            .is_err());
        assert!(store.list_versions(resume).await.unwrap().is_empty());
        assert!(store.latest_version(resume).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stores_sharing_storage_see_each_others_saves() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let first = VersionStore::new(storage.clone());
        let second = VersionStore::new(storage);
        let resume = Uuid::new_v4();

        // Both stores read before either writes.
        assert!(first.list_versions(resume).await.unwrap().is_empty());
        assert!(second.list_versions(resume).await.unwrap().is_empty());

        first
            .save_version(resume, ResumeContent::default(), manual("one"))
            .await
            .unwrap();
        let saved = second
            .save_version(resume, ResumeContent::default(), auto())
            .await
            .unwrap();
        assert_eq!(saved.version, 2);
        assert_eq!(first.list_versions(resume).await.unwrap().len(), 2);
    }
}
