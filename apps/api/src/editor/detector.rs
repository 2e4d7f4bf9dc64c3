use tracing::debug;

use crate::editor::snapshot::{diff_snapshots, ChangeType, GlobalStateSnapshot, SnapshotDiff};
use crate::editor::undo::UndoStore;

/// Watches the live editor state and pushes an undo entry whenever a tracked
/// domain changes.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    previous: Option<GlobalStateSnapshot>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares `current` with the last observed state.
    ///
    /// The first observation only sets the baseline. While `undo` is paused the
    /// baseline moves to `current` without recording, so an applied snapshot is
    /// never mistaken for a user edit.
    pub fn observe(
        &mut self,
        current: &GlobalStateSnapshot,
        undo: &mut UndoStore,
    ) -> Option<ChangeType> {
        let previous = match self.previous.replace(current.clone()) {
            Some(previous) => previous,
            None => return None,
        };

        if undo.is_paused() {
            return None;
        }

        let diff = diff_snapshots(&previous, current);
        let change_type = diff.change_type()?;
        let description = describe_change(&diff, current);
        debug!("Detected {:?} change: {description}", change_type);
        undo.push_entry(change_type, description, previous);
        Some(change_type)
    }
}

/// Builds the label shown in the undo menu for a change.
pub fn describe_change(diff: &SnapshotDiff, current: &GlobalStateSnapshot) -> String {
    match diff.change_type() {
        None => "No changes".to_string(),
        Some(ChangeType::Template) => format!("Changed template to \"{}\"", current.template),
        Some(ChangeType::Bulk) => {
            let labels: Vec<&str> = diff.domains.iter().map(|d| d.label()).collect();
            match labels.as_slice() {
                [first, second] => format!("Updated {first} and {second}"),
                _ => format!("Updated {} sections", labels.len()),
            }
        }
        Some(domain) => match diff.paths.as_slice() {
            [single] => format!("Updated {}", field_label(single)),
            [] => format!("Updated {}", domain.label()),
            many => format!("Updated {} {} fields", many.len(), domain.label()),
        },
    }
}

/// `user_info.name` → `name`, `style_customization.primary_color` → `primary color`.
fn field_label(path: &str) -> String {
    let leaf = path.rsplit('.').next().unwrap_or(path);
    let leaf = leaf.split('[').next().unwrap_or(leaf);
    leaf.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{PersonalInfoDraft, StyleCustomization, TemplateId};

    fn state(name: &str, template: &str) -> GlobalStateSnapshot {
        GlobalStateSnapshot {
            template: TemplateId::from(template),
            user_info: PersonalInfoDraft {
                name: name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_first_observation_sets_baseline_only() {
        let mut detector = ChangeDetector::new();
        let mut undo = UndoStore::default();
        assert_eq!(detector.observe(&state("A", "modern"), &mut undo), None);
        assert!(undo.entries().is_empty());
        // The baseline is in place: the same state again is not a change.
        assert_eq!(detector.observe(&state("A", "modern"), &mut undo), None);
    }

    #[test]
    fn test_unchanged_state_is_noop() {
        let mut detector = ChangeDetector::new();
        let mut undo = UndoStore::default();
        detector.observe(&state("A", "modern"), &mut undo);
        assert_eq!(detector.observe(&state("A", "modern"), &mut undo), None);
        assert!(undo.entries().is_empty());
    }

    #[test]
    fn test_name_change_records_previous_snapshot() {
        let mut detector = ChangeDetector::new();
        let mut undo = UndoStore::default();
        detector.observe(&state("A", "modern"), &mut undo);
        let change = detector.observe(&state("B", "modern"), &mut undo);

        assert_eq!(change, Some(ChangeType::UserInfo));
        let entry = &undo.entries()[0];
        assert_eq!(entry.snapshot.user_info.name, "A");
        assert_eq!(entry.description, "Updated name");
    }

    #[test]
    fn test_multi_domain_change_is_bulk() {
        let mut detector = ChangeDetector::new();
        let mut undo = UndoStore::default();
        detector.observe(&state("A", "modern"), &mut undo);
        let change = detector.observe(&state("B", "classic"), &mut undo);
        assert_eq!(change, Some(ChangeType::Bulk));
        assert_eq!(
            undo.entries()[0].description,
            "Updated template and personal info"
        );
    }

    #[test]
    fn test_paused_store_rebaselines_without_recording() {
        let mut detector = ChangeDetector::new();
        let mut undo = UndoStore::default();
        detector.observe(&state("A", "modern"), &mut undo);

        undo.pause();
        assert_eq!(detector.observe(&state("Z", "modern"), &mut undo), None);
        undo.resume();

        // The restored state is the new baseline.
        assert_eq!(detector.observe(&state("Z", "modern"), &mut undo), None);
        assert!(undo.entries().is_empty());
    }

    #[test]
    fn test_describe_template_and_style_changes() {
        let old = state("A", "modern");
        let new = state("A", "classic");
        let diff = diff_snapshots(&old, &new);
        assert_eq!(describe_change(&diff, &new), "Changed template to \"classic\"");

        let mut styled = old.clone();
        styled.style_customization = StyleCustomization {
            primary_color: Some("#112233".to_string()),
            font_size: Some(11.0),
            ..Default::default()
        };
        let diff = diff_snapshots(&old, &styled);
        assert_eq!(describe_change(&diff, &styled), "Updated 2 style fields");
    }
}
