//! Recent calculation history, as far as the editor needs it.
//!
//! The editor only ever asks one question of history: "what is the most recent
//! entry?" (used to restore the input field on startup). Entries are kept in
//! insertion order, capped at `RECENT_HISTORY_MAX`, and a push whose editor
//! state equals the current entry is skipped.

use crate::EditorState;
use tracing::trace;

/// Maximum number of entries retained.
pub const RECENT_HISTORY_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    pub id: u64,
    pub editor: EditorState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentHistory {
    entries: Vec<HistoryState>,
    next_id: u64,
}

impl RecentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `editor` as the newest entry. Returns `false` when skipped as a duplicate.
    pub fn push(&mut self, editor: EditorState) -> bool {
        if self.current().is_some_and(|cur| cur.editor == editor) {
            trace!(target: "history", "push_skipped_duplicate");
            return false;
        }
        self.next_id += 1;
        self.entries.push(HistoryState {
            id: self.next_id,
            editor,
        });
        if self.entries.len() > RECENT_HISTORY_MAX {
            let overflow = self.entries.len() - RECENT_HISTORY_MAX;
            self.entries.drain(..overflow);
            trace!(target: "history", overflow, "trimmed");
        }
        true
    }

    /// Most recent entry.
    pub fn current(&self) -> Option<&HistoryState> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryState> {
        self.entries.iter()
    }
}
