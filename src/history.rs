use std::sync::Arc;

use crate::surface::Snapshot;

/// Maximum number of retained history entries; the oldest is evicted beyond
/// this.
pub const MAX_ENTRIES: usize = 50;

/// Linear undo/redo history of full-surface snapshots.
///
/// Entries are ordered oldest-to-newest with a cursor at the entry currently
/// on screen. Recording after a rewind truncates the redo branch; there is no
/// branching history. Invariant: `cursor < entries.len()` whenever entries is
/// non-empty.
pub struct History {
    entries: Vec<Arc<Snapshot>>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends a snapshot after the cursor, discarding any redo entries, and
    /// evicts from the front once the cap is exceeded.
    pub fn record(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(Arc::new(snapshot));
        self.cursor = self.entries.len() - 1;
        if self.entries.len() > MAX_ENTRIES {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Steps the cursor back and returns the snapshot to restore, or `None`
    /// at the oldest entry.
    pub fn undo(&mut self) -> Option<Arc<Snapshot>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(Arc::clone(&self.entries[self.cursor]))
    }

    /// Steps the cursor forward and returns the snapshot to restore, or
    /// `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Arc<Snapshot>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(Arc::clone(&self.entries[self.cursor]))
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The snapshot at the cursor, i.e. what is currently on screen.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.entries.get(self.cursor).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
