//! Snapshot-based undo/redo history for mdpad.
//!
//! Every entry is a full copy of the document text. The history never looks at
//! how the caller produced the content; it only keeps the two stacks consistent.

mod history;
mod snapshot;

pub use history::{History, HistoryStats, DEFAULT_MAX_SIZE};
pub use snapshot::Snapshot;
