//! Editor state value object and recent history snapshots.
//!
//! `EditorState` is the single value the editor publishes after every accepted
//! mutation: the expression text plus a cursor position. It is never mutated in
//! place; each transition builds a fresh state and the old one is superseded
//! wholesale (it survives only inside change events and history entries).
//!
//! Invariant (enforced by every constructor):
//! - `0 <= selection <= char_len(text)`; positions are measured in chars.

use core_text::char_len;
use std::fmt;

pub mod history;
pub use history::{HistoryState, RecentHistory};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EditorState {
    text: String,
    selection: usize,
}

impl EditorState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a state, clamping `selection` into the text.
    pub fn create(text: impl Into<String>, selection: usize) -> Self {
        let text = text.into();
        let selection = selection.min(char_len(&text));
        Self { text, selection }
    }

    /// Same text as `base`, new (clamped) selection.
    pub fn for_new_selection(base: &EditorState, selection: usize) -> Self {
        Self::create(base.text.clone(), selection)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Renders the text with the cursor drawn as `|`.
impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (left, right) = core_text::split_at(&self.text, self.selection);
        write!(f, "{left}|{right}")
    }
}
