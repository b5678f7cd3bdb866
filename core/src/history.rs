//! Snapshot-based undo/redo.
//!
//! Every edit records a full snapshot. The history also remembers which entry
//! matches the file on disk, so "dirty" is simply "current entry is not the
//! saved one". That stays correct across undo past the save point, redo back
//! to it, and branching away from it.

use std::collections::VecDeque;

use circuitry_types::HistoryLimit;

#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    current: Option<usize>,
    saved: Option<usize>,
    limit: usize,
}

impl<T> History<T> {
    /// History holding `initial` as its only, clean entry.
    pub fn new(initial: T, limit: HistoryLimit) -> Self {
        let mut history = Self {
            entries: VecDeque::new(),
            current: None,
            saved: None,
            limit: limit.get(),
        };
        history.reset(initial);
        history
    }

    /// Forget everything and start over from `snapshot`, marked saved.
    pub fn reset(&mut self, snapshot: T) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.current = Some(0);
        self.saved = Some(0);
    }

    /// Record the state after an edit.
    ///
    /// Entries after the current one are discarded. When the history is full
    /// the oldest entry is dropped and indices shift down by one.
    pub fn record(&mut self, snapshot: T) {
        let keep = self.current.map_or(0, |i| i + 1);
        if self.saved.is_some_and(|saved| saved >= keep) {
            self.saved = None;
        }
        self.entries.truncate(keep);
        self.entries.push_back(snapshot);

        let mut dropped = 0;
        while self.entries.len() > self.limit {
            self.entries.pop_front();
            dropped += 1;
        }
        self.current = Some(self.entries.len() - 1);
        if dropped > 0 {
            self.saved = self.saved.and_then(|saved| saved.checked_sub(dropped));
        }
    }

    /// Step back and return the snapshot to restore. `None` at the oldest
    /// entry.
    pub fn undo(&mut self) -> Option<&T> {
        let current = self.current.filter(|&i| i > 0)?;
        self.current = Some(current - 1);
        self.entries.get(current - 1)
    }

    /// Step forward and return the snapshot to restore. `None` at the newest
    /// entry.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.current.map_or(0, |i| i + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.current = Some(next);
        self.entries.get(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.current.map_or(0, |i| i + 1) < self.entries.len()
    }

    /// The current entry now matches what is on disk.
    pub fn mark_saved(&mut self) {
        self.saved = self.current;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.current != self.saved
    }

    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.current?)
    }

    /// One-based position and entry count, e.g. `(3, 7)`.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.current.map_or(0, |i| i + 1), self.entries.len())
    }

    /// Change the capacity. Takes effect on the next [`record`](Self::record).
    pub fn set_limit(&mut self, limit: HistoryLimit) {
        self.limit = limit.get();
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}
