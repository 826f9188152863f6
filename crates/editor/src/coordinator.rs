//! Reconciles user typing, external content and undo/redo into one document value.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use mdpad_config::EditorSettings;
use mdpad_history::{History, HistoryStats, Snapshot, DEFAULT_MAX_SIZE};

use crate::debounce::Debounce;

/// Default quiet period before a burst of edits becomes one undo step.
pub const DEFAULT_EDIT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Single owner of the document text for one editor.
///
/// Every write goes through this type: user edits (`on_user_edit`), content
/// pushed from outside (`load_external`) and history navigation (`undo`/`redo`).
/// Readers such as autosave only borrow it, so content is always read live.
#[derive(Debug)]
pub struct EditCoordinator {
    history: History,
    /// Authoritative document value (rendered and persisted)
    canonical: String,
    /// What the input widget currently shows
    local_buffer: String,
    file_path: Option<PathBuf>,
    dirty: bool,
    /// Commits a burst of edits to history once typing settles
    edit_commit: Debounce,
    /// Swallow the widget's echo of content we just wrote into it
    suppress_echo: bool,
    /// Bumped on every `load_external`
    session_id: u64,
    /// Bumped on every content change
    revision: u64,
}

impl EditCoordinator {
    pub fn new(history_size: usize, edit_debounce: Duration) -> Self {
        Self {
            history: History::with_capacity(history_size),
            canonical: String::new(),
            local_buffer: String::new(),
            file_path: None,
            dirty: false,
            edit_commit: Debounce::new(edit_debounce),
            suppress_echo: false,
            session_id: 0,
            revision: 0,
        }
    }

    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self::new(settings.history_size, settings.edit_debounce())
    }

    // === User input path ===

    /// Apply a change event from the input widget.
    ///
    /// The document is updated immediately; the history push waits until the
    /// edit debounce elapses (see [`tick`](Self::tick)). Returns `false` when the
    /// event was only the widget echoing content set by the coordinator.
    pub fn on_user_edit(&mut self, content: impl Into<String>, now: Instant) -> bool {
        let content = content.into();

        if std::mem::take(&mut self.suppress_echo) && content == self.local_buffer {
            log::debug!("Ignored input echo after external update");
            return false;
        }

        self.local_buffer.clone_from(&content);
        self.canonical = content;
        self.dirty = true;
        self.revision += 1;
        self.edit_commit.arm(now);
        true
    }

    /// Commit the pending edit burst once the debounce has elapsed.
    ///
    /// Returns `true` if a snapshot was pushed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.edit_commit.fire(now) {
            self.commit_snapshot();
            return true;
        }
        false
    }

    /// Commit a pending edit burst immediately.
    pub fn flush_pending_edit(&mut self) {
        if self.edit_commit.is_pending() {
            self.edit_commit.cancel();
            self.commit_snapshot();
        }
    }

    /// Drop a pending edit burst without recording it.
    pub fn cancel_pending_edit(&mut self) {
        self.edit_commit.cancel();
    }

    pub fn has_pending_edit(&self) -> bool {
        self.edit_commit.is_pending()
    }

    // === External content path ===

    /// Replace the document with content from outside (file open, new document).
    ///
    /// Starts a new session: the pending edit burst is discarded so it can never
    /// land in the new document's history. With `reset_history`, history is
    /// cleared and seeded with the loaded content as the first undo target.
    pub fn load_external(&mut self, content: impl Into<String>, reset_history: bool) {
        let content = content.into();

        self.edit_commit.cancel();
        self.local_buffer.clone_from(&content);
        self.canonical = content;
        self.dirty = false;
        self.suppress_echo = true;
        self.session_id += 1;
        self.revision += 1;

        if reset_history {
            self.history.clear();
            self.history.push(Snapshot::new(self.canonical.clone()));
        }
    }

    // === History navigation ===

    /// Step back one history entry. Returns the content to show, or `None` if
    /// there is nothing to undo (no state changes in that case).
    pub fn undo(&mut self) -> Option<String> {
        self.flush_pending_edit();
        let restored = self.history.undo(Snapshot::new(self.canonical.clone()))?;
        Some(self.apply_restored(restored.into_content()))
    }

    /// Step forward one history entry. Returns the content to show, or `None`.
    pub fn redo(&mut self) -> Option<String> {
        self.flush_pending_edit();
        let restored = self.history.redo(Snapshot::new(self.canonical.clone()))?;
        Some(self.apply_restored(restored.into_content()))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.edit_commit.is_pending()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    // === Session state ===

    pub fn content(&self) -> &str {
        &self.canonical
    }

    pub fn local_buffer(&self) -> &str {
        &self.local_buffer
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record that the content at (`session_id`, `revision`) reached storage.
    ///
    /// Clears `dirty` only if nothing changed since; returns whether it did.
    pub fn mark_saved(&mut self, session_id: u64, revision: u64) -> bool {
        if session_id == self.session_id && revision == self.revision {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    fn commit_snapshot(&mut self) {
        self.history.push(Snapshot::new(self.canonical.clone()));
    }

    fn apply_restored(&mut self, content: String) -> String {
        self.local_buffer.clone_from(&content);
        self.canonical.clone_from(&content);
        self.dirty = true;
        self.suppress_echo = true;
        self.revision += 1;
        content
    }
}

impl Default for EditCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, DEFAULT_EDIT_DEBOUNCE)
    }
}
