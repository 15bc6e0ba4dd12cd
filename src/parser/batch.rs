//! `GO` batch splitting.
//!
//! SQL Server tools treat a line containing only `GO` as a batch separator.
//! It is not T-SQL: the lexer reports such lines as
//! [`TokenKind::BatchSeparator`] and the token stream is cut there, so each
//! batch is parsed on its own. `GO` inside comments or string literals never
//! reaches this point.

use super::token::{Token, TokenKind};

/// The tokens of one batch, terminated by an `Eof` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub tokens: Vec<Token>,
}

impl Batch {
    /// True if the batch holds nothing but its `Eof`.
    pub fn is_empty(&self) -> bool {
        self.tokens.iter().all(Token::is_eof)
    }
}

/// Split lexer output into batches at `GO` separators.
///
/// Each batch ends with an `Eof` token; batches cut at a separator get one
/// located at the separator. Empty batches (e.g. consecutive `GO` lines) are
/// dropped.
pub fn split_batches(tokens: Vec<Token>) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::BatchSeparator => {
                current.push(Token::new(TokenKind::Eof, "", token.location));
                push_batch(&mut batches, std::mem::take(&mut current));
            }
            TokenKind::Eof => {
                current.push(token);
                push_batch(&mut batches, std::mem::take(&mut current));
            }
            _ => current.push(token),
        }
    }

    // Streams built by hand may lack the trailing `Eof`.
    if !current.is_empty() {
        push_batch(&mut batches, current);
    }
    batches
}

fn push_batch(batches: &mut Vec<Batch>, tokens: Vec<Token>) {
    let batch = Batch { tokens };
    if !batch.is_empty() {
        batches.push(batch);
    }
}
