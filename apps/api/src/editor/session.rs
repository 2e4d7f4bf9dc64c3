//! Editor session: the explicit context object for one open resume.
//!
//! Each session owns its live state and undo timeline; nothing is global.
//! Handlers reach sessions through the `SessionRegistry` held in `AppState`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::editor::detector::ChangeDetector;
use crate::editor::history::{diff_content, HistoryChange, HistoryEntry, HistoryStore};
use crate::editor::snapshot::{ChangeType, GlobalStateSnapshot};
use crate::editor::undo::{UndoEntry, UndoStore};
use crate::models::resume::{
    JobInfoDraft, PersonalInfoDraft, ResumeContent, StyleCustomization, TemplateId,
};
use crate::versions::ResumeVersion;

#[derive(Debug, Clone)]
pub struct EditorSession {
    resume_id: Uuid,
    live: GlobalStateSnapshot,
    content: ResumeContent,
    undo: UndoStore,
    detector: ChangeDetector,
}

/// Serializable view of a session for the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub resume_id: Uuid,
    pub state: GlobalStateSnapshot,
    pub content: ResumeContent,
    pub can_undo: bool,
    pub can_redo: bool,
    pub current_index: Option<usize>,
}

impl EditorSession {
    pub fn new(
        resume_id: Uuid,
        initial: GlobalStateSnapshot,
        content: ResumeContent,
        max_undo_entries: usize,
    ) -> Self {
        let mut session = Self {
            resume_id,
            live: initial,
            content,
            undo: UndoStore::new(max_undo_entries),
            detector: ChangeDetector::new(),
        };
        session.track();
        session
    }

    pub fn snapshot(&self) -> &GlobalStateSnapshot {
        &self.live
    }

    pub fn content(&self) -> &ResumeContent {
        &self.content
    }

    pub fn undo_entries(&self) -> &[UndoEntry] {
        self.undo.entries()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            resume_id: self.resume_id,
            state: self.live.clone(),
            content: self.content.clone(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            current_index: self.undo.current_index(),
        }
    }

    pub fn set_template(&mut self, template: TemplateId) -> Option<ChangeType> {
        self.live.template = template;
        self.track()
    }

    pub fn set_style(&mut self, style: StyleCustomization) -> Option<ChangeType> {
        self.live.style_customization = style;
        self.track()
    }

    pub fn set_user_info(&mut self, user_info: PersonalInfoDraft) -> Option<ChangeType> {
        self.live.user_info = user_info;
        self.track()
    }

    pub fn set_job_info(&mut self, job_info: JobInfoDraft) -> Option<ChangeType> {
        self.live.job_info = job_info;
        self.track()
    }

    /// Replaces the whole editor state as one user edit.
    pub fn apply_bulk(&mut self, state: GlobalStateSnapshot) -> Option<ChangeType> {
        self.live = state;
        self.track()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.undo(&self.live) {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Returns `false` when there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.undo.redo() {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Previews the state stored in undo entry `index`.
    pub fn jump_to(&mut self, index: usize) -> bool {
        match self.undo.jump_to(index, &self.live) {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Replaces the resume content, returning the field-level changes.
    pub fn update_content(&mut self, content: ResumeContent) -> Vec<HistoryChange> {
        let changes = diff_content(&self.content, &content);
        self.content = content;
        changes
    }

    /// Applies a saved version. Template and style changes are recorded on the
    /// undo timeline as one edit; the content changes are returned for the
    /// history log.
    pub fn restore_version(&mut self, version: &ResumeVersion) -> Vec<HistoryChange> {
        let changes = self.update_content(version.content.clone());
        if let Some(template) = &version.template {
            self.live.template = template.clone();
        }
        if let Some(style) = &version.style_customization {
            self.live.style_customization = style.clone();
        }
        self.track();
        changes
    }

    fn track(&mut self) -> Option<ChangeType> {
        self.detector.observe(&self.live, &mut self.undo)
    }

    /// Writes a snapshot into the live state without recording it. The pause
    /// spans the write and the detector's re-baseline, all synchronously.
    fn apply_snapshot(&mut self, snapshot: GlobalStateSnapshot) {
        self.undo.pause();
        self.live = snapshot;
        self.track();
        self.undo.resume();
        debug!("Applied snapshot to session {}", self.resume_id);
    }
}

/// All open editor sessions plus their per-resume history logs.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, EditorSession>,
    history: HistoryStore,
    max_undo_entries: usize,
}

impl SessionRegistry {
    pub fn new(max_undo_entries: usize, max_history_entries: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            history: HistoryStore::new(max_history_entries),
            max_undo_entries,
        }
    }

    /// Opens a session, replacing any existing one for the resume.
    pub fn open(
        &mut self,
        resume_id: Uuid,
        initial: GlobalStateSnapshot,
        content: ResumeContent,
    ) -> &mut EditorSession {
        info!("Opening editor session for resume {resume_id}");
        let session = EditorSession::new(resume_id, initial, content, self.max_undo_entries);
        match self.sessions.entry(resume_id) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(session);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(session),
        }
    }

    pub fn get(&self, resume_id: Uuid) -> Option<&EditorSession> {
        self.sessions.get(&resume_id)
    }

    pub fn get_mut(&mut self, resume_id: Uuid) -> Option<&mut EditorSession> {
        self.sessions.get_mut(&resume_id)
    }

    pub fn close(&mut self, resume_id: Uuid) -> bool {
        self.sessions.remove(&resume_id).is_some()
    }

    /// Updates a session's content and logs the field-level changes.
    /// Returns `None` when no session is open or nothing changed.
    pub fn update_content(
        &mut self,
        resume_id: Uuid,
        content: ResumeContent,
        description: &str,
    ) -> Option<HistoryEntry> {
        let session = self.sessions.get_mut(&resume_id)?;
        let changes = session.update_content(content);
        self.history.record(resume_id, description, changes)
    }

    /// Applies a saved version to an open session and logs its content
    /// changes. Returns `None` when no session is open.
    pub fn restore_version(
        &mut self,
        resume_id: Uuid,
        version: &ResumeVersion,
    ) -> Option<&EditorSession> {
        let session = self.sessions.get_mut(&resume_id)?;
        let changes = session.restore_version(version);
        self.history.record(
            resume_id,
            format!("Restored version {}", version.version),
            changes,
        );
        Some(&*session)
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }
}
