use crate::types::{Arrangement, Track, TrackSettings};
use std::sync::Arc;

pub const DEFAULT_HISTORY_DEPTH: usize = 100;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable capture of the whole arrangement. Tracks are shared by `Arc`,
/// so capturing is O(tracks) regardless of clip count; edits copy a track out
/// of the sharing on write, never a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    tracks: Vec<Arc<Track>>,
    settings: Vec<TrackSettings>,
}

impl Snapshot {
    pub fn capture(arrangement: &Arrangement) -> Self {
        Self {
            tracks: arrangement.tracks.clone(),
            settings: arrangement.settings.clone(),
        }
    }

    fn restore(&self, arrangement: &mut Arrangement) {
        arrangement.tracks = self.tracks.clone();
        arrangement.settings = self.settings.clone();
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Snapshot-based undo/redo. One discrete user action is one snapshot; a
/// continuous drag records only its final drop. Undo and redo on an empty
/// stack are silent no-ops.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Push a pre-mutation snapshot. Any redoable future is discarded.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.redo_stack.clear();
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    /// Restore the previous snapshot. Returns false (and changes nothing)
    /// when there is no history.
    pub fn undo(&mut self, arrangement: &mut Arrangement) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(Snapshot::capture(arrangement));
        snapshot.restore(arrangement);
        true
    }

    /// Symmetric counterpart of `undo`.
    pub fn redo(&mut self, arrangement: &mut Arrangement) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(Snapshot::capture(arrangement));
        snapshot.restore(arrangement);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
