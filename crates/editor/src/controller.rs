//! One open document: coordinator, autosave and storage wired together.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::Result;
use mdpad_config::Config;
use mdpad_history::HistoryStats;
use mdpad_persistence::{self as persistence, Persistence, UNTITLED};

use crate::autosave::{AutosaveScheduler, SaveOrigin, SaveOutcome, SaveRequest};
use crate::blocks::{self, Block};
use crate::command::{CommandResult, EditorCommand};
use crate::coordinator::EditCoordinator;
use crate::notify::{Notification, Notifier};
use crate::stats::DocumentStats;

/// Poll interval of [`DocumentController::finish_saving`].
const SAVE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Document session driven by input events and periodic ticks.
///
/// All methods run on the owning thread; `tick` must be called regularly
/// (each event-loop iteration) to commit edit bursts and run autosave.
pub struct DocumentController<P: Persistence> {
    coordinator: EditCoordinator,
    autosave: AutosaveScheduler,
    persistence: P,
    notifier: Box<dyn Notifier>,
    /// File modification time at load/save (for detecting external changes)
    saved_mtime: Option<SystemTime>,
    external_change_detected: bool,
    title: String,
}

impl<P: Persistence> DocumentController<P> {
    /// Create a controller holding a new, empty document.
    pub fn new(persistence: P, config: &Config, notifier: Box<dyn Notifier>) -> Self {
        let mut controller = Self {
            coordinator: EditCoordinator::from_settings(&config.editor),
            autosave: AutosaveScheduler::from_settings(&config.autosave),
            persistence,
            notifier,
            saved_mtime: None,
            external_change_detected: false,
            title: UNTITLED.to_string(),
        };
        controller.new_document(Instant::now());
        controller
    }

    // === Document lifecycle ===

    /// Replace the document with an empty one that has no path.
    pub fn new_document(&mut self, now: Instant) -> String {
        self.coordinator.load_external(String::new(), true);
        self.coordinator.set_file_path(None);
        self.reset_file_state(UNTITLED.to_string(), None);
        self.observe(now);
        log::info!("New document");
        String::new()
    }

    /// Load a file, starting a fresh history. Returns the content to display.
    pub fn open(&mut self, path: &Path, now: Instant) -> Result<String> {
        let info = self.persistence.open(path).map_err(|e| {
            log::error!("Failed to open {}: {:#}", path.display(), e);
            e
        })?;

        self.coordinator.load_external(info.content, true);
        self.coordinator.set_file_path(Some(path.to_path_buf()));
        self.reset_file_state(info.name, persistence::file_mtime(path));
        self.observe(now);
        log::info!("Opened {}", path.display());

        Ok(self.coordinator.content().to_string())
    }

    /// Stop background work. No autosave runs after this.
    pub fn shutdown(&mut self) {
        self.coordinator.cancel_pending_edit();
        self.autosave.teardown();
        log::debug!("Document controller shut down");
    }

    // === Editing ===

    /// Apply a change event from the input widget.
    pub fn edit(&mut self, content: impl Into<String>, now: Instant) -> bool {
        let accepted = self.coordinator.on_user_edit(content, now);
        if accepted {
            self.observe(now);
        }
        accepted
    }

    /// Replace the text of one block (see [`blocks`](Self::blocks)).
    ///
    /// If `text` lacks a final newline the block's original line ending is
    /// appended, so it does not run into the next block. Returns `false` if
    /// `index` is out of range or nothing changed.
    pub fn edit_block(&mut self, index: usize, text: impl Into<String>, now: Instant) -> bool {
        let mut blocks = blocks::segment(self.coordinator.content());
        let Some(block) = blocks.get_mut(index) else {
            return false;
        };
        let mut text = text.into();
        if !text.ends_with('\n') {
            text.push_str(block.line_ending());
        }
        block.text = text;

        let content = blocks::join(&blocks);
        if content == self.coordinator.content() {
            return false;
        }
        self.edit(content, now)
    }

    /// Undo; returns the content to display or `None` at the history boundary.
    pub fn undo(&mut self, now: Instant) -> Option<String> {
        let content = self.coordinator.undo()?;
        self.observe(now);
        Some(content)
    }

    /// Redo; returns the content to display or `None` at the history boundary.
    pub fn redo(&mut self, now: Instant) -> Option<String> {
        let content = self.coordinator.redo()?;
        self.observe(now);
        Some(content)
    }

    // === Saving ===

    /// Save to the current path.
    pub fn save(&mut self) -> SaveRequest {
        let request = self
            .autosave
            .save_now(&self.coordinator, &self.persistence);

        match request {
            SaveRequest::Started | SaveRequest::Inactive => {}
            SaveRequest::AlreadySaving => self
                .notifier
                .notify(Notification::info("A save is already in progress")),
            SaveRequest::NoPath => self
                .notifier
                .notify(Notification::error("Choose a file name to save this document")),
        }
        request
    }

    /// Give the document a new path, then save it there.
    pub fn save_as(&mut self, path: PathBuf, now: Instant) -> SaveRequest {
        if self.autosave.is_saving() {
            self.notifier
                .notify(Notification::info("A save is already in progress"));
            return SaveRequest::AlreadySaving;
        }

        self.title = persistence::path_to_title(&path);
        self.coordinator.set_file_path(Some(path));
        self.observe(now);
        self.save()
    }

    /// Block until a running save reports, ticking the controller meanwhile.
    ///
    /// Call before [`shutdown`](Self::shutdown), which discards an unfinished
    /// save. Returns `false` if a save was still running after `timeout`.
    pub fn finish_saving(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.autosave.is_saving() {
            let now = Instant::now();
            if now >= deadline {
                log::warn!("Save still running after {:?}", timeout);
                return false;
            }
            self.tick(now);
            if self.autosave.is_saving() {
                std::thread::sleep(SAVE_POLL_INTERVAL);
            }
        }
        true
    }

    // === Event loop ===

    /// Commit settled edits, finish saves and start due autosaves.
    pub fn tick(&mut self, now: Instant) -> Option<SaveOutcome> {
        self.coordinator.tick(now);

        let outcome = self
            .autosave
            .tick(now, &mut self.coordinator, &self.persistence)?;
        self.report(&outcome);
        Some(outcome)
    }

    /// Dispatch a command from a menu or key binding.
    pub fn handle_command(&mut self, command: EditorCommand, now: Instant) -> CommandResult {
        match command {
            EditorCommand::Undo => self
                .undo(now)
                .map(CommandResult::ContentReplaced)
                .unwrap_or_default(),
            EditorCommand::Redo => self
                .redo(now)
                .map(CommandResult::ContentReplaced)
                .unwrap_or_default(),
            EditorCommand::Save => CommandResult::Save(self.save()),
            EditorCommand::SaveAs(path) => CommandResult::Save(self.save_as(path, now)),
            EditorCommand::Open(path) => match self.open(&path, now) {
                Ok(content) => CommandResult::ContentReplaced(content),
                Err(e) => {
                    let message = format!("{:#}", e);
                    self.notifier.notify(Notification::error(message.clone()));
                    CommandResult::Error(message)
                }
            },
            EditorCommand::NewDocument => CommandResult::ContentReplaced(self.new_document(now)),
            EditorCommand::GetModificationStatus => CommandResult::ModificationStatus {
                is_dirty: self.coordinator.is_dirty(),
                has_external_change: self.external_change_detected,
            },
            EditorCommand::GetHistoryStats => CommandResult::HistoryStats(self.history_stats()),
        }
    }

    /// Check if the file was modified outside this editor since load/save.
    pub fn check_external_modification(&mut self) -> bool {
        if let Some(path) = self.coordinator.file_path() {
            if persistence::was_modified_externally(path, self.saved_mtime) {
                if !self.external_change_detected {
                    log::warn!("{} was modified externally", path.display());
                }
                self.external_change_detected = true;
            }
        }
        self.external_change_detected
    }

    // === Read accessors (safe to poll every frame) ===

    pub fn content(&self) -> &str {
        self.coordinator.content()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.coordinator.file_path()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_dirty(&self) -> bool {
        self.coordinator.is_dirty()
    }

    pub fn is_saving(&self) -> bool {
        self.autosave.is_saving()
    }

    pub fn can_undo(&self) -> bool {
        self.coordinator.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.coordinator.can_redo()
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.coordinator.history_stats()
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::of(self.coordinator.content())
    }

    pub fn blocks(&self) -> Vec<Block> {
        blocks::segment(self.coordinator.content())
    }

    pub fn coordinator(&self) -> &EditCoordinator {
        &self.coordinator
    }

    fn observe(&mut self, now: Instant) {
        self.autosave.observe(
            self.coordinator.file_path(),
            self.coordinator.is_dirty(),
            now,
        );
    }

    fn reset_file_state(&mut self, title: String, mtime: Option<SystemTime>) {
        self.title = title;
        self.saved_mtime = mtime;
        self.external_change_detected = false;
    }

    fn report(&mut self, outcome: &SaveOutcome) {
        match outcome {
            SaveOutcome::Saved { ticket, .. } => {
                self.saved_mtime = persistence::file_mtime(&ticket.path);
                self.external_change_detected = false;
                if ticket.origin == SaveOrigin::Manual {
                    self.notifier.notify(Notification::info(format!(
                        "Saved {}",
                        persistence::path_to_title(&ticket.path)
                    )));
                }
            }
            SaveOutcome::Failed { ticket, error } => {
                let notification = match ticket.origin {
                    SaveOrigin::Auto => Notification::warning(format!("Autosave failed: {}", error)),
                    SaveOrigin::Manual => Notification::error(error.clone()),
                };
                self.notifier.notify(notification);
            }
            SaveOutcome::Superseded { .. } => {}
        }
    }
}

impl<P: Persistence> Drop for DocumentController<P> {
    fn drop(&mut self) {
        self.autosave.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{LogNotifier, NotificationLevel};
    use mdpad_persistence::{FileInfo, FsPersistence, PendingSave, SaveCompleter, SaveResult};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// In-memory storage; saves complete when the test says so.
    /// Clones share state, so the test keeps a handle after handing one over.
    #[derive(Clone, Default)]
    struct MemoryStorage {
        files: Rc<RefCell<HashMap<PathBuf, String>>>,
        saves: Rc<RefCell<Vec<(PathBuf, String)>>>,
        completers: Rc<RefCell<Vec<SaveCompleter>>>,
    }

    impl MemoryStorage {
        fn with_file(path: &str, content: &str) -> Self {
            let storage = Self::default();
            storage
                .files
                .borrow_mut()
                .insert(PathBuf::from(path), content.to_string());
            storage
        }
    }

    impl Persistence for MemoryStorage {
        fn open(&self, path: &Path) -> Result<FileInfo> {
            let content = self
                .files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Failed to read file: {}", path.display()))?;
            Ok(FileInfo {
                path: path.to_string_lossy().into_owned(),
                content,
                name: persistence::path_to_title(path),
            })
        }

        fn save(&self, path: &Path, content: String) -> PendingSave {
            self.saves.borrow_mut().push((path.to_path_buf(), content));
            let (completer, pending) = PendingSave::channel();
            self.completers.borrow_mut().push(completer);
            pending
        }
    }

    type Inbox = Rc<RefCell<Vec<Notification>>>;

    fn controller(storage: &MemoryStorage) -> (DocumentController<MemoryStorage>, Inbox) {
        let inbox: Inbox = Rc::default();
        let sink = Rc::clone(&inbox);
        let notifier = Box::new(move |n: Notification| sink.borrow_mut().push(n));
        let controller = DocumentController::new(storage.clone(), &Config::default(), notifier);
        (controller, inbox)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn finish_save(storage: &MemoryStorage, result: SaveResult) {
        let completer = storage.completers.borrow_mut().remove(0);
        completer.complete(result);
    }

    #[test]
    fn test_new_controller_is_clean_and_untitled() {
        let storage = MemoryStorage::default();
        let (controller, _) = controller(&storage);

        assert_eq!(controller.content(), "");
        assert_eq!(controller.title(), UNTITLED);
        assert!(!controller.is_dirty());
        assert!(controller.file_path().is_none());
        assert_eq!(controller.history_stats().undo_count, 1);
    }

    #[test]
    fn test_open_edit_autosave_cycle() {
        let storage = MemoryStorage::with_file("/doc.md", "# Doc\n");
        let (mut controller, inbox) = controller(&storage);
        let start = Instant::now();

        let shown = controller.open(Path::new("/doc.md"), start).unwrap();
        assert_eq!(shown, "# Doc\n");
        assert_eq!(controller.title(), "doc.md");

        controller.edit("# Doc\nmore", start);
        controller.tick(start + ms(500));
        assert_eq!(controller.history_stats().undo_count, 2);

        controller.tick(start + ms(2000));
        assert!(controller.is_saving());
        assert_eq!(storage.saves.borrow()[0].1, "# Doc\nmore");

        finish_save(&storage, SaveResult::ok());
        let outcome = controller.tick(start + ms(2100)).unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved { clean: true, .. }));
        assert!(!controller.is_dirty());
        // Autosave success is silent
        assert!(inbox.borrow().is_empty());
    }

    #[test]
    fn test_open_missing_file_keeps_document() {
        let storage = MemoryStorage::default();
        let (mut controller, inbox) = controller(&storage);
        let start = Instant::now();
        controller.edit("keep me", start);

        let result = controller.handle_command(EditorCommand::Open(PathBuf::from("/nope.md")), start);

        assert!(matches!(result, CommandResult::Error(_)));
        assert_eq!(controller.content(), "keep me");
        assert_eq!(inbox.borrow()[0].level, NotificationLevel::Error);
    }

    #[test]
    fn test_undo_redo_commands() {
        let storage = MemoryStorage::default();
        let (mut controller, _) = controller(&storage);
        let start = Instant::now();

        controller.edit("one", start);
        controller.tick(start + ms(500));
        controller.edit("one two", start + ms(1000));

        let result = controller.handle_command(EditorCommand::Undo, start + ms(1100));
        assert_eq!(result.replaced_content(), Some("one"));
        assert!(controller.can_redo());

        let result = controller.handle_command(EditorCommand::Redo, start + ms(1200));
        assert_eq!(result.replaced_content(), Some("one two"));

        let result = controller.handle_command(EditorCommand::GetHistoryStats, start);
        assert_eq!(
            result,
            CommandResult::HistoryStats(HistoryStats {
                undo_count: 3,
                redo_count: 0
            })
        );
    }

    #[test]
    fn test_undo_at_boundary_is_a_no_op() {
        let storage = MemoryStorage::default();
        let (mut controller, _) = controller(&storage);
        let start = Instant::now();

        // The seed of a new document can be undone once, then nothing
        controller.handle_command(EditorCommand::Undo, start);
        let result = controller.handle_command(EditorCommand::Undo, start);
        assert_eq!(result, CommandResult::None);
        assert!(!controller.can_undo());
    }

    #[test]
    fn test_manual_save_without_path_is_visible_error() {
        let storage = MemoryStorage::default();
        let (mut controller, inbox) = controller(&storage);
        controller.edit("draft", Instant::now());

        assert_eq!(controller.save(), SaveRequest::NoPath);
        assert_eq!(inbox.borrow()[0].level, NotificationLevel::Error);
        assert!(storage.saves.borrow().is_empty());
    }

    #[test]
    fn test_save_as_then_failures_by_origin() {
        let storage = MemoryStorage::default();
        let (mut controller, inbox) = controller(&storage);
        let start = Instant::now();
        controller.edit("draft", start);

        let request = controller.save_as(PathBuf::from("/out/draft.md"), start);
        assert_eq!(request, SaveRequest::Started);
        assert_eq!(controller.title(), "draft.md");

        finish_save(&storage, SaveResult::failed("Failed to save file: denied"));
        controller.tick(start + ms(10));
        assert!(controller.is_dirty());
        assert_eq!(
            inbox.borrow().last().unwrap(),
            &Notification::error("Failed to save file: denied")
        );

        // An autosave failure is only a warning
        controller.edit("draft 2", start + ms(20));
        controller.tick(start + ms(2020));
        finish_save(&storage, SaveResult::failed("Failed to save file: denied"));
        controller.tick(start + ms(2030));
        assert_eq!(
            inbox.borrow().last().unwrap().level,
            NotificationLevel::Warning
        );
    }

    #[test]
    fn test_reload_during_save_leaves_new_document_clean() {
        let storage = MemoryStorage::with_file("/b.md", "b");
        let (mut controller, _) = controller(&storage);
        let start = Instant::now();

        controller.edit("a", start);
        controller.save_as(PathBuf::from("/a.md"), start);
        assert!(controller.is_saving());

        controller.open(Path::new("/b.md"), start + ms(2050)).unwrap();
        finish_save(&storage, SaveResult::ok());
        let outcome = controller.tick(start + ms(2100));

        assert!(matches!(outcome, Some(SaveOutcome::Superseded { .. })));
        assert_eq!(controller.content(), "b");
        assert!(!controller.is_dirty());
    }

    #[test]
    fn test_shutdown_stops_autosave() {
        let storage = MemoryStorage::default();
        let (mut controller, _) = controller(&storage);
        let start = Instant::now();
        controller.save_as(PathBuf::from("/a.md"), start);
        finish_save(&storage, SaveResult::ok());
        controller.tick(start);

        controller.edit("late edit", start + ms(10));
        controller.shutdown();
        controller.tick(start + ms(60_000));

        assert_eq!(storage.saves.borrow().len(), 1);
    }

    #[test]
    fn test_edit_block() {
        let storage = MemoryStorage::default();
        let (mut controller, _) = controller(&storage);
        let start = Instant::now();
        controller.edit("# Title\n\nold\n", start);

        assert!(controller.edit_block(2, "new\n", start));
        assert_eq!(controller.content(), "# Title\n\nnew\n");
        assert!(!controller.edit_block(2, "new\n", start));
        assert!(!controller.edit_block(10, "x", start));
    }

    #[test]
    fn test_edit_block_keeps_line_ending() {
        let storage = MemoryStorage::default();
        let (mut controller, _) = controller(&storage);
        let start = Instant::now();
        controller.edit("# Title\n\nold\n\n## Next\n", start);

        assert!(controller.edit_block(2, "new", start));
        assert_eq!(controller.content(), "# Title\n\nnew\n\n## Next\n");

        let blocks = controller.blocks();
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[4].kind, crate::BlockKind::Heading(2));
    }

    #[test]
    fn test_finish_saving_waits_for_result() {
        let storage = MemoryStorage::default();
        let (mut controller, _) = controller(&storage);
        let start = Instant::now();

        // Nothing running
        assert!(controller.finish_saving(ms(10)));

        controller.edit("draft", start);
        controller.save_as(PathBuf::from("/draft.md"), start);
        assert!(!controller.finish_saving(ms(30)));
        assert!(controller.is_saving());
        assert!(controller.is_dirty());

        finish_save(&storage, SaveResult::ok());
        assert!(controller.finish_saving(ms(1000)));
        assert!(!controller.is_saving());
        assert!(!controller.is_dirty());
    }

    #[test]
    fn test_explicit_save_lands_before_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.md");
        let original = "line\n".repeat(200_000);
        std::fs::write(&path, &original).unwrap();

        let mut controller =
            DocumentController::new(FsPersistence, &Config::default(), Box::new(LogNotifier));
        let start = Instant::now();
        controller.open(&path, start).unwrap();
        let edited = format!("{}appended\n", original);
        controller.edit(edited.clone(), start);
        assert_eq!(controller.save(), SaveRequest::Started);

        // Quitting right away: wait, then tear down
        assert!(controller.finish_saving(Duration::from_secs(10)));
        controller.shutdown();

        assert!(!controller.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), edited);
    }

    #[test]
    fn test_echo_after_open_does_not_dirty() {
        let storage = MemoryStorage::with_file("/doc.md", "text");
        let (mut controller, _) = controller(&storage);
        let start = Instant::now();
        controller.open(Path::new("/doc.md"), start).unwrap();

        assert!(!controller.edit("text", start));
        let status = controller.handle_command(EditorCommand::GetModificationStatus, start);
        assert_eq!(status.modification_status(), Some((false, false)));
    }

    #[test]
    fn test_file_system_round_trip_and_external_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "start").unwrap();

        let mut controller =
            DocumentController::new(FsPersistence, &Config::default(), Box::new(LogNotifier));
        let start = Instant::now();
        controller.open(&path, start).unwrap();
        controller.edit("start and more", start);
        assert_eq!(controller.save(), SaveRequest::Started);

        // The save runs on a background thread
        let mut outcome = None;
        for _ in 0..200 {
            outcome = controller.tick(start + ms(10));
            if outcome.is_some() {
                break;
            }
            std::thread::sleep(ms(5));
        }
        assert!(matches!(outcome, Some(SaveOutcome::Saved { clean: true, .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "start and more");
        assert!(!controller.check_external_modification());
    }
}
