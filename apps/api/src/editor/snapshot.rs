use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::resume::{JobInfoDraft, PersonalInfoDraft, StyleCustomization, TemplateId};

/// The entire mutable editor state at one instant.
///
/// Snapshots are owned values: cloning is a deep copy, so a snapshot held by
/// the undo store never aliases the live editor state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GlobalStateSnapshot {
    pub template: TemplateId,
    pub style_customization: StyleCustomization,
    pub user_info: PersonalInfoDraft,
    pub job_info: JobInfoDraft,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    UserInfo,
    JobInfo,
    Template,
    StyleCustomization,
    Bulk,
}

impl ChangeType {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeType::UserInfo => "personal info",
            ChangeType::JobInfo => "job info",
            ChangeType::Template => "template",
            ChangeType::StyleCustomization => "style",
            ChangeType::Bulk => "multiple sections",
        }
    }

    /// Top-level snapshot key for single-domain change types.
    fn field(&self) -> Option<&'static str> {
        match self {
            ChangeType::UserInfo => Some("user_info"),
            ChangeType::JobInfo => Some("job_info"),
            ChangeType::Template => Some("template"),
            ChangeType::StyleCustomization => Some("style_customization"),
            ChangeType::Bulk => None,
        }
    }
}

/// Tracked domains in the order they are reported.
pub const TRACKED_DOMAINS: [ChangeType; 4] = [
    ChangeType::Template,
    ChangeType::StyleCustomization,
    ChangeType::UserInfo,
    ChangeType::JobInfo,
];

/// Result of comparing two snapshots.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotDiff {
    pub domains: Vec<ChangeType>,
    /// Dotted paths of every leaf that differs, e.g. `user_info.name`.
    pub paths: Vec<String>,
}

impl SnapshotDiff {
    /// `None` when nothing changed, `Bulk` when more than one domain changed.
    pub fn change_type(&self) -> Option<ChangeType> {
        match self.domains.as_slice() {
            [] => None,
            [single] => Some(*single),
            _ => Some(ChangeType::Bulk),
        }
    }
}

pub fn diff_snapshots(old: &GlobalStateSnapshot, new: &GlobalStateSnapshot) -> SnapshotDiff {
    let domains: Vec<ChangeType> = TRACKED_DOMAINS
        .into_iter()
        .filter(|domain| match domain {
            ChangeType::Template => old.template != new.template,
            ChangeType::StyleCustomization => old.style_customization != new.style_customization,
            ChangeType::UserInfo => old.user_info != new.user_info,
            ChangeType::JobInfo => old.job_info != new.job_info,
            ChangeType::Bulk => false,
        })
        .collect();

    if domains.is_empty() {
        return SnapshotDiff::default();
    }

    let old_value = serde_json::to_value(old).unwrap_or_default();
    let new_value = serde_json::to_value(new).unwrap_or_default();
    let paths = domains
        .iter()
        .filter_map(|d| d.field())
        .flat_map(|field| {
            let mut paths = Vec::new();
            collect_paths(
                field,
                old_value.get(field).unwrap_or(&Value::Null),
                new_value.get(field).unwrap_or(&Value::Null),
                &mut paths,
            );
            paths
        })
        .collect();

    SnapshotDiff { domains, paths }
}

/// Returns the normalized paths of every leaf that differs between two JSON
/// values. Object keys are compared as sets, so key order never matters.
pub fn diff_paths(old: &Value, new: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths("", old, new, &mut paths);
    paths
}

fn collect_paths(prefix: &str, old: &Value, new: &Value, out: &mut Vec<String>) {
    match (old, new) {
        (Value::Object(a), Value::Object(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_paths(
                    &path,
                    a.get(key).unwrap_or(&Value::Null),
                    b.get(key).unwrap_or(&Value::Null),
                    out,
                );
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            for i in 0..a.len().max(b.len()) {
                collect_paths(
                    &format!("{prefix}[{i}]"),
                    a.get(i).unwrap_or(&Value::Null),
                    b.get(i).unwrap_or(&Value::Null),
                    out,
                );
            }
        }
        (a, b) if a != b => out.push(prefix.to_string()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(name: &str) -> GlobalStateSnapshot {
        GlobalStateSnapshot {
            template: TemplateId::from("modern"),
            user_info: PersonalInfoDraft {
                name: name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_snapshots_have_no_diff() {
        let diff = diff_snapshots(&snapshot("A"), &snapshot("A"));
        assert!(diff.domains.is_empty());
        assert_eq!(diff.change_type(), None);
    }

    #[test]
    fn test_single_domain_change() {
        let diff = diff_snapshots(&snapshot("A"), &snapshot("B"));
        assert_eq!(diff.change_type(), Some(ChangeType::UserInfo));
        assert_eq!(diff.paths, vec!["user_info.name".to_string()]);
    }

    #[test]
    fn test_multiple_domains_are_bulk() {
        let old = snapshot("A");
        let mut new = snapshot("B");
        new.template = TemplateId::from("classic");
        let diff = diff_snapshots(&old, &new);
        assert_eq!(diff.change_type(), Some(ChangeType::Bulk));
        assert_eq!(
            diff.domains,
            vec![ChangeType::Template, ChangeType::UserInfo]
        );
        assert!(diff.paths.contains(&"template".to_string()));
    }

    #[test]
    fn test_diff_paths_ignores_key_order() {
        let a = json!({ "x": 1, "y": { "z": true } });
        let b = json!({ "y": { "z": true }, "x": 1 });
        assert!(diff_paths(&a, &b).is_empty());
    }

    #[test]
    fn test_diff_paths_arrays_and_missing_keys() {
        let a = json!({ "list": [1, 2], "gone": "v" });
        let b = json!({ "list": [1, 3, 4] });
        assert_eq!(
            diff_paths(&a, &b),
            vec!["gone".to_string(), "list[1]".to_string(), "list[2]".to_string()]
        );
    }
}
