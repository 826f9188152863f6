use std::collections::VecDeque;

use crate::Snapshot;

/// Default number of undo entries kept.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Stack sizes, for enabling/disabling undo and redo affordances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub undo_count: usize,
    pub redo_count: usize,
}

/// Edit history for undo/redo
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshot stack for undo (front is the oldest entry)
    undo_stack: VecDeque<Snapshot>,
    /// Snapshot stack for redo
    redo_stack: Vec<Snapshot>,
    /// Maximum undo stack size
    max_size: usize,
}

impl History {
    /// Create a new history
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SIZE)
    }

    /// Create history with specified size
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Maximum number of undo entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Record a snapshot.
    ///
    /// A snapshot whose content equals the most recent entry is dropped and the
    /// redo stack is left alone; only a real new edit invalidates redo.
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.push_unique(snapshot) {
            self.redo_stack.clear();
        }
    }

    /// Step back one entry.
    ///
    /// `current` is the caller's live content; it is archived for redo. Returns
    /// the entry recorded before the most recent one. When only one entry is
    /// left it is returned itself, after which `can_undo()` is false.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let popped = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);

        match self.undo_stack.back() {
            Some(previous) => Some(previous.clone()),
            None => Some(popped),
        }
    }

    /// Step forward one entry, archiving `current` for undo.
    ///
    /// The restored entry is recorded on top of `current`, so the top of the
    /// undo stack keeps matching what the caller displays.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.push_unique(current);
        self.push_unique(next.clone());
        Some(next)
    }

    /// Check if undo is possible
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is possible
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Current stack sizes.
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
        }
    }

    /// Most recent undo entry, if any.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.undo_stack.back()
    }

    /// Append unless it repeats the top entry. Returns whether it was appended.
    fn push_unique(&mut self, snapshot: Snapshot) -> bool {
        if self
            .undo_stack
            .back()
            .is_some_and(|last| last.content == snapshot.content)
        {
            return false;
        }

        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
        true
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(content: &str) -> Snapshot {
        Snapshot::at(content, 0)
    }

    fn stats(undo_count: usize, redo_count: usize) -> HistoryStats {
        HistoryStats {
            undo_count,
            redo_count,
        }
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::new();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.stats(), stats(0, 0));
        assert!(history.undo(snap("live")).is_none());
        assert!(history.redo(snap("live")).is_none());
        // Nothing was archived by the failed calls
        assert_eq!(history.stats(), stats(0, 0));
    }

    #[test]
    fn test_duplicate_pushes_are_coalesced() {
        let mut history = History::new();

        for _ in 0..5 {
            history.push(snap("same"));
        }

        assert_eq!(history.stats().undo_count, 1);
    }

    #[test]
    fn test_duplicate_push_keeps_redo() {
        let mut history = History::new();
        history.push(snap("a"));
        history.push(snap("b"));

        assert_eq!(history.undo(snap("b")).unwrap().content, "a");
        assert!(history.can_redo());

        // Top is "a" again; pushing it is not a new edit
        history.push(snap("a"));
        assert!(history.can_redo());
    }

    #[test]
    fn test_new_push_invalidates_redo() {
        let mut history = History::new();
        history.push(snap("A"));
        history.push(snap("B"));
        history.undo(snap("B"));
        assert!(history.can_redo());

        history.push(snap("C"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::with_capacity(3);

        for i in 0..5 {
            history.push(snap(&format!("s{}", i)));
        }

        assert_eq!(history.stats().undo_count, 3);
        assert_eq!(history.latest().unwrap().content, "s4");

        // Walk back to the oldest survivor
        assert_eq!(history.undo(snap("s4")).unwrap().content, "s3");
        assert_eq!(history.undo(snap("s3")).unwrap().content, "s2");
        assert_eq!(history.undo(snap("s2")).unwrap().content, "s2");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = History::with_capacity(0);
        history.push(snap("a"));
        history.push(snap("b"));

        assert_eq!(history.max_size(), 1);
        assert_eq!(history.stats().undo_count, 1);
    }

    #[test]
    fn test_undo_redo_scenario() {
        let mut history = History::new();
        history.push(snap("first"));
        history.push(snap("second"));
        history.push(snap("third"));

        let restored = history.undo(snap("third-current")).unwrap();
        assert_eq!(restored.content, "second");
        assert_eq!(history.stats(), stats(2, 1));

        let restored = history.undo(snap("second")).unwrap();
        assert_eq!(restored.content, "first");
        assert_eq!(history.stats(), stats(1, 2));

        let restored = history.redo(snap("first")).unwrap();
        assert_eq!(restored.content, "second");
        assert_eq!(history.stats(), stats(2, 1));
    }

    #[test]
    fn test_single_entry_undo_returns_it_once() {
        let mut history = History::new();
        history.push(snap("only"));
        assert!(history.can_undo());

        let restored = history.undo(snap("only-live")).unwrap();
        assert_eq!(restored.content, "only");
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert!(history.undo(snap("only")).is_none());
        assert_eq!(history.stats(), stats(0, 1));
    }

    #[test]
    fn test_redo_returns_archived_live_content() {
        let mut history = History::new();
        history.push(snap("saved"));
        history.push(snap("typed"));

        let restored = history.undo(snap("typed and more")).unwrap();
        assert_eq!(restored.content, "saved");

        let restored = history.redo(snap("saved")).unwrap();
        assert_eq!(restored.content, "typed and more");
    }

    #[test]
    fn test_undo_then_redo_round_trip() {
        let states = ["s1", "s2", "s3", "s4", "s5"];
        let mut history = History::new();
        for state in states {
            history.push(snap(state));
        }

        let mut shown = states[states.len() - 1].to_string();
        let mut undone = Vec::new();
        for _ in 0..states.len() - 1 {
            undone.push(shown.clone());
            shown = history.undo(snap(&shown)).unwrap().content;
        }
        assert_eq!(shown, "s1");

        for expected in undone.iter().rev() {
            shown = history.redo(snap(&shown)).unwrap().content;
            assert_eq!(&shown, expected);
        }
        assert_eq!(shown, "s5");
        assert!(!history.can_redo());

        // Walking back again visits the same intermediate states
        assert_eq!(history.undo(snap("s5")).unwrap().content, "s4");
        assert_eq!(history.undo(snap("s4")).unwrap().content, "s3");
    }

    #[test]
    fn test_redo_after_emptying_undo_stack() {
        let mut history = History::new();
        history.push(snap("only"));
        history.undo(snap("live"));
        assert!(!history.can_undo());

        assert_eq!(history.redo(snap("only")).unwrap().content, "live");
        assert_eq!(history.stats(), stats(2, 0));
        assert_eq!(history.undo(snap("live")).unwrap().content, "only");
    }

    #[test]
    fn test_redo_respects_capacity() {
        let mut history = History::with_capacity(2);
        history.push(snap("a"));
        history.push(snap("b"));
        history.undo(snap("b-live"));

        // Live content differs from the top, so two entries are recorded
        history.redo(snap("a-edited"));
        assert_eq!(history.stats().undo_count, 2);
        assert_eq!(history.latest().unwrap().content, "b-live");
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.push(snap("a"));
        history.push(snap("b"));
        history.undo(snap("b"));

        history.clear();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.stats(), stats(0, 0));
    }
}
