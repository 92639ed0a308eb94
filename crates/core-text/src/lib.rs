//! Char-indexed text primitives for the expression input field.
//!
//! Every position handled by the editor (cursor, selection bounds, splice
//! points) is a count of Unicode scalar values, never a byte offset. The
//! helpers here translate those positions into byte ranges on demand so the
//! rest of the workspace can slice `&str` without worrying about UTF-8
//! boundaries. All helpers clamp: a position past the end maps to the end.
//!
//! Modules:
//! - `token`: token classification (`TokenKind`, `TokenClassifier`, `MathClassifier`).
//! - `split`: `SplitText`, the left/mid/right decomposition used by insert and erase.
//! - `format`: the `Formatter` seam and the digit-grouping `GroupingFormatter`.

pub mod format;
pub mod split;
pub mod token;

pub use format::{Formatted, Formatter, GroupingFormatter, NumberFormat};
pub use split::SplitText;
pub use token::{MathClassifier, TokenClassifier, TokenKind};

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the char at `char_idx`, or `s.len()` when the index is at or past the end.
pub fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

/// Substring covering chars `[start, end)`. Bounds are clamped and an inverted
/// range yields the empty string.
pub fn slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let from = byte_offset(s, start);
    let to = byte_offset(s, end);
    &s[from..to]
}

/// Split at a char index (clamped).
pub fn split_at(s: &str, char_idx: usize) -> (&str, &str) {
    s.split_at(byte_offset(s, char_idx))
}

/// Drop up to `n` trailing chars, saturating at the empty string.
pub fn drop_last(s: &str, n: usize) -> &str {
    let keep = char_len(s).saturating_sub(n);
    split_at(s, keep).0
}

/// Char at `char_idx`, if any.
pub fn char_at(s: &str, char_idx: usize) -> Option<char> {
    s.chars().nth(char_idx)
}

/// Clamp a signed position into `[0, max]`.
pub fn clamp(value: isize, max: usize) -> usize {
    if value <= 0 {
        0
    } else {
        (value as usize).min(max)
    }
}
