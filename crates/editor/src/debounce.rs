//! Single-shot, re-armable deadline timer.
//!
//! Timers never fire on their own: the owner checks them on each tick with the
//! current `Instant`, which keeps all state changes on one thread.

use std::time::{Duration, Instant};

/// Deadline that is re-armed by every trigger and fires once after a quiet period.
#[derive(Debug, Clone)]
pub struct Debounce {
    /// Quiet period after the last trigger
    delay: Duration,
    /// Pending deadline (None when idle)
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the quiet period, replacing any pending deadline.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once when the deadline has passed, disarming the timer.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
