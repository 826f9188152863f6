//! Handle for a save that completes on another thread.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::SaveResult;

/// Result of a save that may still be running.
#[derive(Debug)]
pub struct PendingSave {
    receiver: Receiver<SaveResult>,
}

/// Sending half of a [`PendingSave`].
#[derive(Debug)]
pub struct SaveCompleter {
    sender: Sender<SaveResult>,
}

impl PendingSave {
    /// Create a connected completer/pending pair.
    pub fn channel() -> (SaveCompleter, PendingSave) {
        let (sender, receiver) = mpsc::channel();
        (SaveCompleter { sender }, PendingSave { receiver })
    }

    /// A save that has already finished.
    pub fn ready(result: SaveResult) -> Self {
        let (completer, pending) = Self::channel();
        completer.complete(result);
        pending
    }

    /// Non-blocking check for the result.
    ///
    /// A completer dropped without reporting counts as a failed save.
    pub fn try_result(&self) -> Option<SaveResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(SaveResult::failed(
                "Failed to save file: save worker stopped without a result",
            )),
        }
    }

    /// Block until the save finishes.
    pub fn wait(self) -> SaveResult {
        self.receiver.recv().unwrap_or_else(|_| {
            SaveResult::failed("Failed to save file: save worker stopped without a result")
        })
    }
}

impl SaveCompleter {
    /// Report the save outcome.
    pub fn complete(self, result: SaveResult) {
        // The receiver may already be gone (session closed); nothing to report to
        let _ = self.sender.send(result);
    }
}
