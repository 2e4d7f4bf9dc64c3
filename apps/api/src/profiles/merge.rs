//! Projects a profile plus a per-resume link into resume content.
//!
//! `merge_profile_content` is pure: the same profile and link always give
//! the same content. It runs on every read of a linked resume.
//!
//! Per section the link selects `Excluded` (only additional items survive),
//! `All`, or `Only(keys)`; per-item overrides are then shallow-merged and
//! additional items appended. Skills are matched by name, case-insensitively.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::models::profile::{
    CertificationOverride, EducationOverride, ExperienceOverride, LinkOverride,
    PersonalInfoOverride, Profile, ProfileLink, ProfileSelection,
};
use crate::models::resume::{
    CertificationItem, EducationItem, ExperienceItem, LinkItem, PersonalInfo, ResumeContent,
};

pub fn merge_profile_content(profile: &Profile, link: &ProfileLink) -> ResumeContent {
    let source = &profile.content;
    let selection = &link.selection;
    let overrides = &link.overrides;

    let mut personal_info = if selection.include_personal_info.0 {
        source.personal_info.clone()
    } else {
        PersonalInfo::default()
    };
    if let Some(o) = &overrides.personal_info {
        apply_personal_info(&mut personal_info, o);
    }
    personal_info.summary = match (&overrides.summary, selection.include_summary.0) {
        (Some(summary), _) => Some(summary.clone()),
        (None, true) => source.personal_info.summary.clone(),
        (None, false) => None,
    };

    ResumeContent {
        personal_info,
        experience: project(
            &source.experience,
            &selection.experience_ids,
            |e| e.id,
            &overrides.experience,
            apply_experience,
            &overrides.additional_experience,
        ),
        education: project(
            &source.education,
            &selection.education_ids,
            |e| e.id,
            &overrides.education,
            apply_education,
            &overrides.additional_education,
        ),
        skills: merge_skills(
            &source.skills,
            &selection.skill_names,
            &overrides.additional_skills,
        ),
        certifications: project(
            &source.certifications,
            &selection.certification_ids,
            |c| c.id,
            &overrides.certifications,
            apply_certification,
            &overrides.additional_certifications,
        ),
        links: project(
            &source.links,
            &selection.link_ids,
            |l| l.id,
            &overrides.links,
            apply_link,
            &overrides.additional_links,
        ),
    }
}

/// Select → override → append, for one id-keyed section.
fn project<T: Clone, O>(
    items: &[T],
    selection: &ProfileSelection<Uuid>,
    id: impl Fn(&T) -> Uuid,
    overrides: &BTreeMap<Uuid, O>,
    apply: impl Fn(&mut T, &O),
    additional: &[T],
) -> Vec<T> {
    items
        .iter()
        .filter(|item| selection.includes(&id(item)))
        .map(|item| {
            let mut item = item.clone();
            if let Some(o) = overrides.get(&id(&item)) {
                apply(&mut item, o);
            }
            item
        })
        .chain(additional.iter().cloned())
        .collect()
}

fn merge_skills(
    skills: &[String],
    selection: &ProfileSelection<String>,
    additional: &[String],
) -> Vec<String> {
    let selected = skills.iter().filter(|skill| match selection {
        ProfileSelection::Excluded => false,
        ProfileSelection::All => true,
        ProfileSelection::Only(names) => names.iter().any(|n| n.eq_ignore_ascii_case(skill)),
    });

    let mut merged: Vec<String> = Vec::new();
    for skill in selected.chain(additional.iter()) {
        if !merged.iter().any(|m| m.eq_ignore_ascii_case(skill)) {
            merged.push(skill.clone());
        }
    }
    merged
}

fn set(target: &mut String, value: &Option<String>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

fn set_opt(target: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *target = Some(v.clone());
    }
}

fn apply_personal_info(info: &mut PersonalInfo, o: &PersonalInfoOverride) {
    set(&mut info.full_name, &o.full_name);
    set(&mut info.email, &o.email);
    set_opt(&mut info.phone, &o.phone);
    set_opt(&mut info.location, &o.location);
    set_opt(&mut info.headline, &o.headline);
}

fn apply_experience(item: &mut ExperienceItem, o: &ExperienceOverride) {
    set(&mut item.company, &o.company);
    set(&mut item.position, &o.position);
    set_opt(&mut item.start_date, &o.start_date);
    set_opt(&mut item.end_date, &o.end_date);
    set_opt(&mut item.location, &o.location);
    if let Some(highlights) = &o.highlights {
        item.highlights = highlights.clone();
    }
}

fn apply_education(item: &mut EducationItem, o: &EducationOverride) {
    set(&mut item.institution, &o.institution);
    set(&mut item.degree, &o.degree);
    set_opt(&mut item.field, &o.field);
    set_opt(&mut item.start_date, &o.start_date);
    set_opt(&mut item.end_date, &o.end_date);
    set_opt(&mut item.gpa, &o.gpa);
}

fn apply_certification(item: &mut CertificationItem, o: &CertificationOverride) {
    set(&mut item.name, &o.name);
    set(&mut item.issuer, &o.issuer);
    set_opt(&mut item.date, &o.date);
    set_opt(&mut item.url, &o.url);
}

fn apply_link(item: &mut LinkItem, o: &LinkOverride) {
    set(&mut item.label, &o.label);
    set(&mut item.url, &o.url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::profile::{IncludeFlag, ProfileContent};

    fn experience(company: &str) -> ExperienceItem {
        ExperienceItem {
            id: Uuid::new_v4(),
            company: company.to_string(),
            position: "Engineer".to_string(),
            start_date: Some("2019-01".to_string()),
            end_date: None,
            location: None,
            highlights: vec!["Shipped things".to_string()],
        }
    }

    fn profile() -> Profile {
        let mut content = ProfileContent {
            experience: vec![experience("Acme"), experience("Globex"), experience("Initech")],
            skills: vec!["Rust".to_string(), "SQL".to_string(), "Go".to_string()],
            ..Default::default()
        };
        content.personal_info.full_name = "Ada Lovelace".to_string();
        content.personal_info.email = "ada@example.com".to_string();
        content.personal_info.summary = Some("Analyst".to_string());
        Profile {
            id: Uuid::new_v4(),
            name: "Main".to_string(),
            content,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn companies(content: &ResumeContent) -> Vec<&str> {
        content.experience.iter().map(|e| e.company.as_str()).collect()
    }

    #[test]
    fn test_default_link_includes_everything() {
        let p = profile();
        let merged = merge_profile_content(&p, &ProfileLink::new(p.id, Uuid::new_v4()));
        assert_eq!(merged, p.content);
    }

    #[test]
    fn test_excluded_experience_keeps_only_additional() {
        let p = profile();
        let mut link = ProfileLink::new(p.id, Uuid::new_v4());
        link.selection.experience_ids = ProfileSelection::Excluded;
        assert!(merge_profile_content(&p, &link).experience.is_empty());

        link.overrides.additional_experience = vec![experience("Side project")];
        let merged = merge_profile_content(&p, &link);
        assert_eq!(companies(&merged), vec!["Side project"]);
    }

    #[test]
    fn test_empty_selection_from_json_means_all() {
        let p = profile();
        let link: ProfileLink = serde_json::from_value(serde_json::json!({
            "profile_id": p.id,
            "resume_id": Uuid::new_v4(),
            "selection": { "experience_ids": [] }
        }))
        .unwrap();
        let merged = merge_profile_content(&p, &link);
        assert_eq!(merged.experience, p.content.experience);
    }

    #[test]
    fn test_subset_keeps_profile_order_and_applies_overrides() {
        let p = profile();
        let acme = p.content.experience[0].id;
        let initech = p.content.experience[2].id;
        let mut link = ProfileLink::new(p.id, Uuid::new_v4());
        link.selection.experience_ids = ProfileSelection::Only(vec![initech, acme]);
        link.overrides.experience.insert(
            acme,
            ExperienceOverride {
                position: Some("Staff Engineer".to_string()),
                ..Default::default()
            },
        );

        let merged = merge_profile_content(&p, &link);
        assert_eq!(companies(&merged), vec!["Acme", "Initech"]);
        assert_eq!(merged.experience[0].position, "Staff Engineer");
        // Fields absent from the override keep the profile value.
        assert_eq!(merged.experience[0].highlights, vec!["Shipped things".to_string()]);
        assert_eq!(merged.experience[1].position, "Engineer");
    }

    #[test]
    fn test_skills_filter_by_name() {
        let p = profile();
        let mut link = ProfileLink::new(p.id, Uuid::new_v4());
        link.selection.skill_names = ProfileSelection::Only(vec!["rust".to_string(), "Go".to_string()]);
        link.overrides.additional_skills = vec!["Kubernetes".to_string(), "RUST".to_string()];
        let merged = merge_profile_content(&p, &link);
        assert_eq!(merged.skills, vec!["Rust", "Go", "Kubernetes"]);
    }

    #[test]
    fn test_personal_info_exclusion_and_overrides() {
        let p = profile();
        let mut link = ProfileLink::new(p.id, Uuid::new_v4());
        link.selection.include_personal_info = IncludeFlag(false);
        link.overrides.personal_info = Some(PersonalInfoOverride {
            full_name: Some("A. Lovelace".to_string()),
            ..Default::default()
        });
        let merged = merge_profile_content(&p, &link);
        assert_eq!(merged.personal_info.full_name, "A. Lovelace");
        assert_eq!(merged.personal_info.email, "");
        // Summary is selected independently.
        assert_eq!(merged.personal_info.summary.as_deref(), Some("Analyst"));

        link.selection.include_summary = IncludeFlag(false);
        assert_eq!(merge_profile_content(&p, &link).personal_info.summary, None);

        link.overrides.summary = Some("Engineer".to_string());
        assert_eq!(
            merge_profile_content(&p, &link).personal_info.summary.as_deref(),
            Some("Engineer")
        );
    }

    #[test]
    fn test_merge_is_deterministic() {
        let p = profile();
        let mut link = ProfileLink::new(p.id, Uuid::new_v4());
        link.selection.skill_names = ProfileSelection::Excluded;
        assert_eq!(merge_profile_content(&p, &link), merge_profile_content(&p, &link));
    }
}
