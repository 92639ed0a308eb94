//! Formatting pass applied to the expression after each text change.
//!
//! A `Formatter` rewrites the whole expression and maps the cursor into the
//! rewritten text so it stays behind the character the user just typed. The
//! editor runs it off the owner thread, so implementations must be
//! `Send + Sync` and free of side effects.
//!
//! `GroupingFormatter` regroups the integer part of every number into blocks
//! of three digits using the configured grouping separator. Separators already
//! present between digits are discarded and recomputed, so the pass is
//! idempotent. Fractional digits (after the decimal point) are left alone.
//! Only separators change, so its cursor mapping counts the other chars.

use crate::{char_len, clamp};
use tracing::trace;

/// Number format rules shared by the classifier and the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    /// `None` disables digit grouping.
    pub grouping_separator: Option<char>,
    pub decimal_point: char,
}

impl NumberFormat {
    pub const fn new(grouping_separator: Option<char>, decimal_point: char) -> Self {
        Self {
            grouping_separator,
            decimal_point,
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::new(Some(' '), '.')
    }
}

/// Output of a formatting pass: rewritten text plus the cursor shift (in chars).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub offset: isize,
}

pub trait Formatter: Send + Sync {
    fn process(&self, text: &str) -> Formatted;

    /// Where a cursor at `cursor` in `original` lands in `formatted`.
    ///
    /// The default shifts by `formatted.offset`, which is exact only when
    /// every change sits left of the cursor.
    fn map_cursor(&self, original: &str, cursor: usize, formatted: &Formatted) -> usize {
        clamp(cursor as isize + formatted.offset, char_len(&formatted.text))
    }
}

/// Digit grouping formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupingFormatter {
    format: NumberFormat,
}

impl GroupingFormatter {
    pub fn new(format: NumberFormat) -> Self {
        Self { format }
    }

    fn push_grouped(&self, out: &mut String, digits: &str) {
        let Some(sep) = self.format.grouping_separator else {
            out.push_str(digits);
            return;
        };
        let len = digits.len(); // ASCII digits only
        for (idx, d) in digits.chars().enumerate() {
            if idx > 0 && (len - idx) % 3 == 0 {
                out.push(sep);
            }
            out.push(d);
        }
    }
}

/// Cursor in `formatted` with as many non-`sep` chars to its left as `cursor`
/// has in `original`. Separators the cursor directly followed are skipped
/// again when they survived formatting.
fn remap_cursor(original: &str, cursor: usize, formatted: &str, sep: char) -> usize {
    let left: Vec<char> = original.chars().take(cursor).collect();
    let kept = left.iter().filter(|&&c| c != sep).count();
    let trailing = left.iter().rev().take_while(|&&c| c == sep).count();

    let mut chars = formatted.chars().peekable();
    let mut pos = 0;
    let mut seen = 0;
    while seen < kept {
        let Some(c) = chars.next() else {
            break;
        };
        pos += 1;
        if c != sep {
            seen += 1;
        }
    }
    let mut skipped = 0;
    while skipped < trailing && chars.next_if_eq(&sep).is_some() {
        pos += 1;
        skipped += 1;
    }
    pos
}

impl Formatter for GroupingFormatter {
    fn process(&self, text: &str) -> Formatted {
        let chars: Vec<char> = text.chars().collect();
        let sep = self.format.grouping_separator;
        let dot = self.format.decimal_point;
        let mut out = String::with_capacity(text.len() + text.len() / 3);
        let mut numbers = 0usize;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c.is_ascii_digit() {
                // Integer part: digits plus separators sitting between two digits.
                let mut digits = String::new();
                while i < chars.len() {
                    let cur = chars[i];
                    if cur.is_ascii_digit() {
                        digits.push(cur);
                        i += 1;
                    } else if sep == Some(cur)
                        && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
                    {
                        i += 1;
                    } else {
                        break;
                    }
                }
                self.push_grouped(&mut out, &digits);
                numbers += 1;
                if chars.get(i) == Some(&dot) {
                    out.push(dot);
                    i += 1;
                    while let Some(d) = chars.get(i).filter(|d| d.is_ascii_digit()) {
                        out.push(*d);
                        i += 1;
                    }
                }
            } else if c == dot {
                out.push(c);
                i += 1;
                while let Some(d) = chars.get(i).filter(|d| d.is_ascii_digit()) {
                    out.push(*d);
                    i += 1;
                }
            } else {
                out.push(c);
                i += 1;
            }
        }
        let offset = char_len(&out) as isize - chars.len() as isize;
        trace!(target: "text.format", numbers, offset, "grouping_pass");
        Formatted { text: out, offset }
    }

    fn map_cursor(&self, original: &str, cursor: usize, formatted: &Formatted) -> usize {
        match self.format.grouping_separator {
            Some(sep) => remap_cursor(original, cursor, &formatted.text, sep),
            None => clamp(cursor as isize + formatted.offset, char_len(&formatted.text)),
        }
    }
}
