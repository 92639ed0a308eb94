//! Token classification.
//!
//! The editor never parses expressions; it only needs to know what kind of
//! token sits at a given position so that insert can decide whether to replace
//! or wrap a selection, and erase can tell a grouping separator from a digit.
//! `TokenClassifier` is that seam. `MathClassifier` is the default used by the
//! editor and understands the single-char vocabulary of the keypad.

use crate::format::NumberFormat;

/// Semantic role of the token at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Digit,
    Dot,
    BinaryOperator,
    GroupingSeparator,
    OpenBracket,
    CloseBracket,
    Postfix,
    Other,
}

/// Classifies the token starting at a char position. Implementations must be
/// side-effect free; out-of-range positions classify as `TokenKind::Other`.
pub trait TokenClassifier {
    fn classify(&self, text: &str, position: usize) -> TokenKind;
}

impl<F> TokenClassifier for F
where
    F: Fn(&str, usize) -> TokenKind,
{
    fn classify(&self, text: &str, position: usize) -> TokenKind {
        self(text, position)
    }
}

/// Keypad-level classifier parameterised by the active number format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathClassifier {
    format: NumberFormat,
}

impl MathClassifier {
    pub fn new(format: NumberFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> NumberFormat {
        self.format
    }

    fn classify_char(&self, c: char) -> TokenKind {
        if c.is_ascii_digit() {
            return TokenKind::Digit;
        }
        if c == self.format.decimal_point {
            return TokenKind::Dot;
        }
        if self.format.grouping_separator == Some(c) {
            return TokenKind::GroupingSeparator;
        }
        match c {
            '+' | '-' | '−' | '*' | '×' | '/' | '÷' | '^' => TokenKind::BinaryOperator,
            '(' | '[' => TokenKind::OpenBracket,
            ')' | ']' => TokenKind::CloseBracket,
            '!' | '%' => TokenKind::Postfix,
            _ => TokenKind::Other,
        }
    }
}

impl Default for MathClassifier {
    fn default() -> Self {
        Self::new(NumberFormat::default())
    }
}

impl TokenClassifier for MathClassifier {
    fn classify(&self, text: &str, position: usize) -> TokenKind {
        crate::char_at(text, position)
            .map(|c| self.classify_char(c))
            .unwrap_or(TokenKind::Other)
    }
}
