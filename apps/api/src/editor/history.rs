//! Per-resume field-level change log for the history panel.
//!
//! Entries are display records only; restoring state goes through the undo
//! store or the version store.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::editor::snapshot::diff_paths;
use crate::models::resume::ResumeContent;

pub const DEFAULT_MAX_HISTORY: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryChange {
    /// Normalized path, e.g. `experience.<id>.company`.
    pub field: String,
    pub section: String,
    pub label: String,
    pub old_value: Value,
    pub new_value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub changes: Vec<HistoryChange>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ResumeHistory {
    pub entries: Vec<HistoryEntry>,
    pub current_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    logs: HashMap<Uuid, ResumeHistory>,
    max_entries: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl HistoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            logs: HashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Appends an entry unless `changes` is empty. Recording moves the
    /// navigation cursor back to the newest entry.
    pub fn record(
        &mut self,
        resume_id: Uuid,
        description: impl Into<String>,
        changes: Vec<HistoryChange>,
    ) -> Option<HistoryEntry> {
        if changes.is_empty() {
            return None;
        }
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            description: description.into(),
            changes,
        };
        let log = self.logs.entry(resume_id).or_default();
        log.entries.push(entry.clone());
        if log.entries.len() > self.max_entries {
            let excess = log.entries.len() - self.max_entries;
            log.entries.drain(..excess);
        }
        log.current_index = None;
        Some(entry)
    }

    pub fn history(&self, resume_id: Uuid) -> Option<&ResumeHistory> {
        self.logs.get(&resume_id)
    }

    pub fn entries(&self, resume_id: Uuid) -> &[HistoryEntry] {
        self.logs
            .get(&resume_id)
            .map(|log| log.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Selects an entry for display. Returns `None` for an unknown index.
    pub fn go_to(&mut self, resume_id: Uuid, index: usize) -> Option<&HistoryEntry> {
        let log = self.logs.get_mut(&resume_id)?;
        if index >= log.entries.len() {
            return None;
        }
        log.current_index = Some(index);
        log.entries.get(index)
    }

    pub fn clear(&mut self, resume_id: Uuid) {
        self.logs.remove(&resume_id);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Content diffing
// ────────────────────────────────────────────────────────────────────────────

/// Field-level changes between two versions of resume content.
pub fn diff_content(old: &ResumeContent, new: &ResumeContent) -> Vec<HistoryChange> {
    let mut changes = Vec::new();

    let old_info = serde_json::to_value(&old.personal_info).unwrap_or_default();
    let new_info = serde_json::to_value(&new.personal_info).unwrap_or_default();
    for path in diff_paths(&old_info, &new_info) {
        changes.push(HistoryChange {
            field: format!("personal_info.{path}"),
            section: "personal_info".to_string(),
            label: humanize(&path),
            old_value: old_info.get(&path).cloned().unwrap_or(Value::Null),
            new_value: new_info.get(&path).cloned().unwrap_or(Value::Null),
        });
    }

    diff_keyed("experience", &old.experience, &new.experience, |e| e.id, &mut changes);
    diff_keyed("education", &old.education, &new.education, |e| e.id, &mut changes);

    if old.skills != new.skills {
        changes.push(HistoryChange {
            field: "skills".to_string(),
            section: "skills".to_string(),
            label: "Skills".to_string(),
            old_value: Value::from(old.skills.clone()),
            new_value: Value::from(new.skills.clone()),
        });
    }

    diff_keyed(
        "certifications",
        &old.certifications,
        &new.certifications,
        |c| c.id,
        &mut changes,
    );
    diff_keyed("links", &old.links, &new.links, |l| l.id, &mut changes);

    changes
}

/// Diffs two id-keyed item lists: additions, removals and per-field edits.
fn diff_keyed<T: Serialize>(
    section: &str,
    old: &[T],
    new: &[T],
    id: impl Fn(&T) -> Uuid,
    out: &mut Vec<HistoryChange>,
) {
    let old_by_id: BTreeMap<Uuid, Value> = old
        .iter()
        .map(|item| (id(item), serde_json::to_value(item).unwrap_or_default()))
        .collect();
    let new_by_id: BTreeMap<Uuid, Value> = new
        .iter()
        .map(|item| (id(item), serde_json::to_value(item).unwrap_or_default()))
        .collect();
    let item_label = humanize(section.trim_end_matches('s'));

    for (item_id, old_value) in &old_by_id {
        match new_by_id.get(item_id) {
            None => out.push(HistoryChange {
                field: format!("{section}.{item_id}"),
                section: section.to_string(),
                label: format!("Removed {}", item_label.to_lowercase()),
                old_value: old_value.clone(),
                new_value: Value::Null,
            }),
            Some(new_value) => {
                for path in diff_paths(old_value, new_value) {
                    let key = path.split(['.', '[']).next().unwrap_or(&path).to_string();
                    out.push(HistoryChange {
                        field: format!("{section}.{item_id}.{path}"),
                        section: section.to_string(),
                        label: format!("{item_label} {}", humanize(&key).to_lowercase()),
                        old_value: old_value.get(&key).cloned().unwrap_or(Value::Null),
                        new_value: new_value.get(&key).cloned().unwrap_or(Value::Null),
                    });
                }
            }
        }
    }

    for (item_id, new_value) in &new_by_id {
        if !old_by_id.contains_key(item_id) {
            out.push(HistoryChange {
                field: format!("{section}.{item_id}"),
                section: section.to_string(),
                label: format!("Added {}", item_label.to_lowercase()),
                old_value: Value::Null,
                new_value: new_value.clone(),
            });
        }
    }
}

/// `full_name` → `Full name`
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().to_string() + chars.as_str(),
    }
}
