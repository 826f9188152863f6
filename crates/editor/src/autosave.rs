//! Debounced, single-flight document saving.
//!
//! Autosave and explicit saves share one in-flight slot: while a save is
//! running no other save starts, whatever its origin.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use mdpad_config::AutosaveSettings;
use mdpad_persistence::{PendingSave, Persistence};

use crate::coordinator::EditCoordinator;
use crate::debounce::Debounce;

/// Default quiet period before an autosave starts.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

/// What started a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    Auto,
    Manual,
}

/// Identifies the document state a save was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub origin: SaveOrigin,
    pub path: PathBuf,
    pub session_id: u64,
    pub revision: u64,
}

/// Answer to a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRequest {
    /// Save is running
    Started,
    /// Another save is still in flight; nothing was queued
    AlreadySaving,
    /// The document has no file path yet
    NoPath,
    /// The scheduler was torn down
    Inactive,
}

/// Completion of an in-flight save, reported once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Content reached storage. `clean` is false when edits landed during the save.
    Saved { ticket: SaveTicket, clean: bool },
    /// Storage rejected the write; the document stays dirty.
    Failed { ticket: SaveTicket, error: String },
    /// Finished after a different document was loaded; no effect on it.
    Superseded { ticket: SaveTicket, success: bool },
}

impl SaveOutcome {
    pub fn ticket(&self) -> &SaveTicket {
        match self {
            SaveOutcome::Saved { ticket, .. }
            | SaveOutcome::Failed { ticket, .. }
            | SaveOutcome::Superseded { ticket, .. } => ticket,
        }
    }
}

#[derive(Debug)]
struct InFlightSave {
    ticket: SaveTicket,
    pending: PendingSave,
}

/// Saves the document after edits settle, never running two saves at once.
#[derive(Debug)]
pub struct AutosaveScheduler {
    timer: Debounce,
    enabled: bool,
    /// Single-flight guard: `Some` while a save is running
    in_flight: Option<InFlightSave>,
    torn_down: bool,
}

impl AutosaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            timer: Debounce::new(delay),
            enabled: true,
            in_flight: None,
            torn_down: false,
        }
    }

    pub fn from_settings(settings: &AutosaveSettings) -> Self {
        let mut scheduler = Self::new(settings.delay());
        scheduler.enabled = settings.enabled;
        scheduler
    }

    /// React to a change of the document's path or dirty flag.
    ///
    /// Call on changes only: every call with a path and `dirty == true` restarts
    /// the quiet period. Any other combination cancels a pending autosave.
    pub fn observe(&mut self, file_path: Option<&Path>, dirty: bool, now: Instant) {
        if self.torn_down || !self.enabled {
            return;
        }

        if file_path.is_some() && dirty {
            self.timer.arm(now);
        } else {
            self.timer.cancel();
        }
    }

    /// Drive the scheduler: report a finished save, then start a due autosave.
    ///
    /// Content is read from `coordinator` at the moment the save starts.
    pub fn tick(
        &mut self,
        now: Instant,
        coordinator: &mut EditCoordinator,
        persistence: &dyn Persistence,
    ) -> Option<SaveOutcome> {
        let outcome = self.poll_completion(coordinator, now);

        if self.timer.fire(now) {
            if self.in_flight.is_some() {
                // Not queued: the next edit re-arms the timer
                log::debug!("Autosave skipped: a save is already in flight");
            } else if coordinator.is_dirty() {
                self.start(SaveOrigin::Auto, coordinator, persistence);
            }
        }

        outcome
    }

    /// Explicit save of the live document, under the same single-flight guard.
    pub fn save_now(
        &mut self,
        coordinator: &EditCoordinator,
        persistence: &dyn Persistence,
    ) -> SaveRequest {
        if self.torn_down {
            return SaveRequest::Inactive;
        }
        if self.in_flight.is_some() {
            return SaveRequest::AlreadySaving;
        }
        if coordinator.file_path().is_none() {
            return SaveRequest::NoPath;
        }

        // The explicit save covers what the pending autosave would have written
        self.timer.cancel();
        self.start(SaveOrigin::Manual, coordinator, persistence)
    }

    /// Stop for good: cancel the pending autosave and detach any running save,
    /// whose result is then discarded.
    pub fn teardown(&mut self) {
        self.timer.cancel();
        if let Some(in_flight) = self.in_flight.take() {
            log::debug!(
                "Detached in-flight save of {}",
                in_flight.ticket.path.display()
            );
        }
        self.torn_down = true;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.timer.cancel();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn start(
        &mut self,
        origin: SaveOrigin,
        coordinator: &EditCoordinator,
        persistence: &dyn Persistence,
    ) -> SaveRequest {
        let Some(path) = coordinator.file_path() else {
            return SaveRequest::NoPath;
        };

        let ticket = SaveTicket {
            origin,
            path: path.to_path_buf(),
            session_id: coordinator.session_id(),
            revision: coordinator.revision(),
        };
        log::debug!("Saving {} ({:?})", ticket.path.display(), origin);

        let pending = persistence.save(path, coordinator.content().to_string());
        self.in_flight = Some(InFlightSave { ticket, pending });
        SaveRequest::Started
    }

    fn poll_completion(
        &mut self,
        coordinator: &mut EditCoordinator,
        now: Instant,
    ) -> Option<SaveOutcome> {
        let result = self.in_flight.as_ref()?.pending.try_result()?;
        let ticket = self.in_flight.take()?.ticket;

        if ticket.session_id != coordinator.session_id() {
            log::info!(
                "Ignoring save of {} that finished after the document was replaced",
                ticket.path.display()
            );
            return Some(SaveOutcome::Superseded {
                ticket,
                success: result.success,
            });
        }

        if !result.success {
            let error = result
                .error
                .unwrap_or_else(|| "Failed to save file".to_string());
            log::error!("Save of {} failed: {}", ticket.path.display(), error);
            return Some(SaveOutcome::Failed { ticket, error });
        }

        let clean = coordinator.mark_saved(ticket.session_id, ticket.revision);
        if clean {
            log::info!("Saved {}", ticket.path.display());
        } else if self.enabled && !self.timer.is_pending() && coordinator.file_path().is_some() {
            // Edits made while saving would otherwise wait for the next keystroke
            self.timer.arm(now);
        }

        Some(SaveOutcome::Saved { ticket, clean })
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}
