//! Non-fatal diagnostics collected while lexing and parsing.

use std::fmt;

use super::token::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unrecognised or unterminated character sequence.
    Lexical,
    /// Token sequence violating the grammar.
    Syntax,
}

/// A diagnostic recorded during parsing. Never thrown; the parser keeps
/// going and returns these next to the (possibly partial) tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub location: Location,
}

impl ParseError {
    pub fn lexical(message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: ParseErrorKind::Lexical,
            message: message.into(),
            location,
        }
    }

    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            location,
        }
    }

    /// Byte offset into the parsed text.
    #[inline]
    pub fn position(&self) -> usize {
        self.location.offset
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ParseErrorKind::Lexical => "lexical error",
            ParseErrorKind::Syntax => "syntax error",
        };
        write!(f, "{} at {}: {}", kind, self.location, self.message)
    }
}

impl std::error::Error for ParseError {}
