//! Left/mid/right decomposition of the expression around the cursor.
//!
//! Contract:
//! - `selection_start..selection_end` is the live selection reported by the
//!   view. Bounds are ordered and clamped to the text before use, so a stale
//!   view can never make slicing panic.
//! - `insertion_pos` is the selection start when something is selected, the
//!   clamped cursor otherwise.
//! - `text_left + <inserted or selected> + text_right` always reconstructs a
//!   valid expression.

use crate::token::{TokenClassifier, TokenKind};
use crate::{char_len, drop_last, slice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitText<'a> {
    text: &'a str,
    pub selection_start: usize,
    pub selection_end: usize,
    pub selection_length: usize,
    pub insertion_pos: usize,
    pub text_selected: bool,
    pub text_left: &'a str,
    pub text_mid: &'a str,
    pub text_right: &'a str,
}

impl<'a> SplitText<'a> {
    pub fn new(text: &'a str, cursor_pos: usize, selection_start: usize, selection_end: usize) -> Self {
        let len = char_len(text);
        let start = selection_start.min(selection_end).min(len);
        let end = selection_start.max(selection_end).min(len);
        let selection_length = end - start;
        let text_selected = selection_length != 0;
        let insertion_pos = if text_selected { start } else { cursor_pos.min(len) };
        Self {
            text,
            selection_start: start,
            selection_end: end,
            selection_length,
            insertion_pos,
            text_selected,
            text_left: slice(text, 0, insertion_pos),
            text_mid: slice(text, start, end),
            text_right: slice(text, insertion_pos + selection_length, len),
        }
    }

    /// Split without a live selection (headless editing).
    pub fn at_cursor(text: &'a str, cursor_pos: usize) -> Self {
        Self::new(text, cursor_pos, cursor_pos, cursor_pos)
    }

    /// Selected text, or nothing when the selection is about to be replaced.
    pub fn text_mid(&self, delete_selection: bool) -> &'a str {
        if delete_selection { "" } else { self.text_mid }
    }

    /// Left part kept after a backspace.
    ///
    /// With a selection only the selection goes away. Otherwise one char is
    /// dropped, or two when the char left of the cursor is a grouping
    /// separator: removing the separator alone would just make the next
    /// formatting pass put it back, so the digit before it goes too.
    pub fn del_text_left(&self, classifier: &dyn TokenClassifier) -> &'a str {
        if self.text_selected {
            return self.text_left;
        }
        let kind = self
            .insertion_pos
            .checked_sub(1)
            .map(|pos| classifier.classify(self.text, pos))
            .unwrap_or(TokenKind::Other);
        match kind {
            TokenKind::GroupingSeparator => drop_last(self.text_left, 2),
            _ => drop_last(self.text_left, 1),
        }
    }

    /// Cursor position after a backspace.
    pub fn del_pos(&self, classifier: &dyn TokenClassifier) -> usize {
        char_len(self.del_text_left(classifier))
    }
}
