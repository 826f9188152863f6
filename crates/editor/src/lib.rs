//! Document state machine for mdpad.
//!
//! Keeps one markdown document consistent across user typing, content loaded
//! from storage, undo/redo and background saving. Time is passed in as
//! `Instant`s and timers fire from `tick`, so the whole state machine runs on
//! the caller's thread.

pub mod blocks;
mod autosave;
mod command;
mod controller;
mod coordinator;
mod debounce;
mod notify;
mod stats;

pub use autosave::{
    AutosaveScheduler, SaveOrigin, SaveOutcome, SaveRequest, SaveTicket, DEFAULT_AUTOSAVE_DELAY,
};
pub use blocks::{Block, BlockKind};
pub use command::{CommandResult, EditorCommand};
pub use controller::DocumentController;
pub use coordinator::{EditCoordinator, DEFAULT_EDIT_DEBOUNCE};
pub use debounce::Debounce;
pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier};
pub use stats::DocumentStats;

pub use mdpad_history::{History, HistoryStats, Snapshot};
