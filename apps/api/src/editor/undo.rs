//! Global undo store: one linear timeline across template, style, personal
//! info and job info edits.
//!
//! Entries store the state *before* each change. The cursor is `None` while
//! the editor shows the live state, `Some(i)` while it shows
//! `entries[i].snapshot`. Leaving the live head records the live snapshot as
//! the redo head, so redoing past the newest entry restores the exact state
//! that was current before the first undo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::editor::snapshot::{ChangeType, GlobalStateSnapshot};

pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UndoEntry {
    pub id: Uuid,
    pub change_type: ChangeType,
    pub description: String,
    pub snapshot: GlobalStateSnapshot,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UndoStore {
    entries: Vec<UndoEntry>,
    cursor: Option<usize>,
    redo_head: Option<GlobalStateSnapshot>,
    paused: bool,
    max_entries: usize,
}

impl Default for UndoStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl UndoStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            redo_head: None,
            paused: false,
            max_entries: max_entries.max(1),
        }
    }

    /// Records the state that existed before a change.
    ///
    /// While navigating (`cursor = Some(i)`) everything after `i` is dropped
    /// first and the cursor returns to the live head. When `previous` is the
    /// state entry `i` holds, that entry is dropped too, so the displayed
    /// state is never stored twice. Returns `false` when the store is paused
    /// and nothing was recorded.
    pub fn push_entry(
        &mut self,
        change_type: ChangeType,
        description: impl Into<String>,
        previous: GlobalStateSnapshot,
    ) -> bool {
        if self.paused {
            return false;
        }

        if let Some(index) = self.cursor.take() {
            let keep = match self.entries.get(index) {
                Some(entry) if entry.snapshot == previous => index,
                _ => index + 1,
            };
            self.entries.truncate(keep);
        }
        self.redo_head = None;

        self.entries.push(UndoEntry {
            id: Uuid::new_v4(),
            change_type,
            description: description.into(),
            snapshot: previous,
            timestamp: Utc::now(),
        });

        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
            debug!("Evicted {excess} oldest undo entries");
        }
        true
    }

    /// Steps back one entry and returns the snapshot to apply.
    ///
    /// `live` is the state currently shown by the editor; it is kept only
    /// when leaving the live head. Returns `None` at the oldest entry.
    pub fn undo(&mut self, live: &GlobalStateSnapshot) -> Option<GlobalStateSnapshot> {
        let target = match self.cursor {
            None if self.entries.is_empty() => return None,
            None => {
                self.redo_head = Some(live.clone());
                self.entries.len() - 1
            }
            Some(0) => return None,
            Some(index) => index - 1,
        };
        self.cursor = Some(target);
        Some(self.entries[target].snapshot.clone())
    }

    /// Steps forward one entry and returns the snapshot to apply. Stepping
    /// past the newest entry returns the live state recorded by the first
    /// undo. Returns `None` at the live head.
    pub fn redo(&mut self) -> Option<GlobalStateSnapshot> {
        let index = self.cursor?;
        if index + 1 < self.entries.len() {
            self.cursor = Some(index + 1);
            return Some(self.entries[index + 1].snapshot.clone());
        }
        self.cursor = None;
        self.redo_head.take()
    }

    /// Moves the cursor directly onto `index` for preview navigation.
    pub fn jump_to(
        &mut self,
        index: usize,
        live: &GlobalStateSnapshot,
    ) -> Option<GlobalStateSnapshot> {
        let entry = self.entries.get(index)?;
        let snapshot = entry.snapshot.clone();
        if self.cursor.is_none() {
            self.redo_head = Some(live.clone());
        }
        self.cursor = Some(index);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        match self.cursor {
            None => !self.entries.is_empty(),
            Some(index) => index > 0,
        }
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Suspends recording while a snapshot is being applied.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
