use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::models::resume::{
    CertificationItem, EducationItem, ExperienceItem, LinkItem, ResumeContent,
};

/// Profile content has the same shape as resume content; a profile is the
/// source a resume projects from.
pub type ProfileContent = ResumeContent;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub content: ProfileContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which items of a profile section a resume includes.
///
/// On the wire: `null` excludes the section, an absent field or `[]` includes
/// everything, a non-empty array includes only the listed keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfileSelection<K> {
    Excluded,
    #[default]
    All,
    Only(Vec<K>),
}

impl<K: PartialEq> ProfileSelection<K> {
    pub fn includes(&self, key: &K) -> bool {
        match self {
            ProfileSelection::Excluded => false,
            ProfileSelection::All => true,
            ProfileSelection::Only(keys) => keys.contains(key),
        }
    }
}

impl<K: Serialize> Serialize for ProfileSelection<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProfileSelection::Excluded => serializer.serialize_none(),
            ProfileSelection::All => Vec::<K>::new().serialize(serializer),
            ProfileSelection::Only(keys) => keys.serialize(serializer),
        }
    }
}

impl<'de, K: Deserialize<'de>> Deserialize<'de> for ProfileSelection<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Vec<K>>::deserialize(deserializer)? {
            None => ProfileSelection::Excluded,
            Some(keys) if keys.is_empty() => ProfileSelection::All,
            Some(keys) => ProfileSelection::Only(keys),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Overrides
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PersonalInfoOverride {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub headline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ExperienceOverride {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub highlights: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EducationOverride {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CertificationOverride {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LinkOverride {
    pub label: Option<String>,
    pub url: Option<String>,
}

/// Per-resume edits layered on top of the profile, plus items that exist only
/// on the resume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProfileOverrides {
    pub personal_info: Option<PersonalInfoOverride>,
    pub summary: Option<String>,
    pub experience: BTreeMap<Uuid, ExperienceOverride>,
    pub education: BTreeMap<Uuid, EducationOverride>,
    pub certifications: BTreeMap<Uuid, CertificationOverride>,
    pub links: BTreeMap<Uuid, LinkOverride>,
    pub additional_experience: Vec<ExperienceItem>,
    pub additional_education: Vec<EducationItem>,
    pub additional_skills: Vec<String>,
    pub additional_certifications: Vec<CertificationItem>,
    pub additional_links: Vec<LinkItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProfileSelectionSet {
    pub include_personal_info: IncludeFlag,
    pub include_summary: IncludeFlag,
    pub experience_ids: ProfileSelection<Uuid>,
    pub education_ids: ProfileSelection<Uuid>,
    pub skill_names: ProfileSelection<String>,
    pub certification_ids: ProfileSelection<Uuid>,
    pub link_ids: ProfileSelection<Uuid>,
}

/// Boolean that defaults to `true` when absent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct IncludeFlag(pub bool);

impl Default for IncludeFlag {
    fn default() -> Self {
        IncludeFlag(true)
    }
}

/// Ties a resume to the profile it projects from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileLink {
    pub profile_id: Uuid,
    pub resume_id: Uuid,
    #[serde(default)]
    pub selection: ProfileSelectionSet,
    #[serde(default)]
    pub overrides: ProfileOverrides,
}

impl ProfileLink {
    /// A link that includes the whole profile with no overrides.
    pub fn new(profile_id: Uuid, resume_id: Uuid) -> Self {
        Self {
            profile_id,
            resume_id,
            selection: ProfileSelectionSet::default(),
            overrides: ProfileOverrides::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize)]
    struct Holder {
        #[serde(default)]
        ids: ProfileSelection<String>,
    }

    #[test]
    fn test_null_selection_is_excluded() {
        let holder: Holder = serde_json::from_value(json!({ "ids": null })).unwrap();
        assert_eq!(holder.ids, ProfileSelection::Excluded);
    }

    #[test]
    fn test_missing_or_empty_selection_is_all() {
        let absent: Holder = serde_json::from_value(json!({})).unwrap();
        let empty: Holder = serde_json::from_value(json!({ "ids": [] })).unwrap();
        assert_eq!(absent.ids, ProfileSelection::All);
        assert_eq!(empty.ids, ProfileSelection::All);
    }

    #[test]
    fn test_listed_selection_is_subset() {
        let holder: Holder = serde_json::from_value(json!({ "ids": ["a", "b"] })).unwrap();
        assert!(holder.ids.includes(&"a".to_string()));
        assert!(!holder.ids.includes(&"c".to_string()));
    }

    #[test]
    fn test_excluded_serializes_as_null() {
        let holder = Holder {
            ids: ProfileSelection::Excluded,
        };
        assert_eq!(serde_json::to_value(&holder).unwrap(), json!({ "ids": null }));
    }

    #[test]
    fn test_include_flags_default_true() {
        let set: ProfileSelectionSet = serde_json::from_value(json!({})).unwrap();
        assert!(set.include_personal_info.0);
        assert!(set.include_summary.0);
    }
}
