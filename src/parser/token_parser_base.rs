//! Base token parser providing common navigation helpers for T-SQL parsing.
//!
//! `TokenParser` owns the token stream and a cursor. Specialized parsers use
//! composition to include a `TokenParser` and delegate common operations:
//!
//! ```ignore
//! pub struct SelectParser {
//!     base: TokenParser,
//! }
//!
//! impl SelectParser {
//!     fn parse_select(&mut self) -> Option<SelectStatement> {
//!         self.base.expect_keyword(Keyword::Select)?;
//!         // ...
//!     }
//! }
//! ```
//!
//! The stream is always terminated by an `Eof` token, so `current_token()`
//! never runs off the end.

use super::identifier_utils::{normalize_identifier, quote_style};
use super::token::{Keyword, Location, Punctuation, Token, TokenKind};
use crate::ast::Identifier;

/// Base token parser with common helper methods for T-SQL parsing.
pub struct TokenParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenParser {
    /// Create a new TokenParser over pre-lexed tokens.
    ///
    /// An `Eof` token is appended if the input does not already end with one.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let location = tokens
                .last()
                .map(|t| {
                    Location::new(
                        t.location.offset + t.text.len(),
                        t.location.line,
                        t.location.column + t.text.chars().count(),
                    )
                })
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", location));
        }
        Self { tokens, pos: 0 }
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    /// Check if the cursor sits on the `Eof` token.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current_token().is_eof()
    }

    /// Get current position in token stream.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Set current position in token stream.
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len() - 1);
    }

    // ========================================================================
    // Token access
    // ========================================================================

    /// Get current token without consuming.
    #[inline]
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Peek at a token at an offset from current position. Clamps to `Eof`.
    #[inline]
    pub fn peek(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    #[inline]
    pub fn location(&self) -> Location {
        self.current_token().location
    }

    /// Advance to next token. Never moves past `Eof`.
    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    // ========================================================================
    // Token type checks
    // ========================================================================

    /// Check if current token is a specific keyword.
    #[inline]
    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current_kind() == TokenKind::Keyword(keyword)
    }

    /// Check if current token is any of the given keywords.
    #[inline]
    pub fn check_any_keyword(&self, keywords: &[Keyword]) -> bool {
        matches!(self.current_kind(), TokenKind::Keyword(k) if keywords.contains(&k))
    }

    /// Check if current token is an unquoted identifier matching (case-insensitive).
    ///
    /// Used for T-SQL words that are only keywords in context (e.g. `APPLY`,
    /// `OFFSET`, `TIES`).
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        let token = self.current_token();
        token.kind == TokenKind::Identifier && token.text.eq_ignore_ascii_case(word)
    }

    #[inline]
    pub fn check_punct(&self, punct: Punctuation) -> bool {
        self.current_kind() == TokenKind::Punctuation(punct)
    }

    #[inline]
    pub fn check_kind(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    // ========================================================================
    // Expect methods (check and advance)
    // ========================================================================

    /// Expect a specific keyword, advancing if found.
    ///
    /// Returns `Some(())` if the keyword was found and position advanced,
    /// `None` otherwise (position unchanged).
    pub fn expect_keyword(&mut self, keyword: Keyword) -> Option<()> {
        if self.check_keyword(keyword) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Expect a specific word (case-insensitive), advancing if found.
    pub fn expect_word_ci(&mut self, word: &str) -> Option<()> {
        if self.check_word_ci(word) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Expect a punctuation token, advancing if found.
    pub fn expect_punct(&mut self, punct: Punctuation) -> Option<()> {
        if self.check_punct(punct) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Expect a token of the given kind, advancing if found.
    pub fn expect_kind(&mut self, kind: TokenKind) -> Option<()> {
        if self.check_kind(kind) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    // ========================================================================
    // Identifier parsing
    // ========================================================================

    /// Parse an identifier (bracketed, quoted or regular).
    ///
    /// Returns the identifier value without brackets/quotes.
    /// Advances position if successful.
    pub fn parse_identifier(&mut self) -> Option<Identifier> {
        let token = self.current_token();
        if token.kind != TokenKind::Identifier {
            return None;
        }
        let ident = Identifier {
            value: normalize_identifier(&token.text),
            quote_style: quote_style(&token.text),
            location: token.location,
        };
        self.advance();
        Some(ident)
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Skip tokens until `stop` returns true for a token at the starting
    /// parenthesis depth, or until a `)` closes the enclosing group.
    ///
    /// The stop token is NOT consumed. Parenthesized groups opened while
    /// skipping are skipped as a whole.
    pub fn skip_until(&mut self, stop: impl Fn(&Token) -> bool) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            let token = self.current_token();
            match token.kind {
                TokenKind::Punctuation(Punctuation::LParen) => depth += 1,
                TokenKind::Punctuation(Punctuation::RParen) => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                    continue;
                }
                _ => {}
            }
            if depth == 0 && stop(token) {
                return;
            }
            self.advance();
        }
    }

    /// Skip a parenthesized group, handling nested parentheses.
    ///
    /// Position should be at the opening parenthesis. After this call,
    /// position will be after the matching closing parenthesis (or at `Eof`).
    pub fn skip_parenthesized(&mut self) {
        if !self.check_punct(Punctuation::LParen) {
            return;
        }

        let mut depth = 0;
        while !self.is_at_end() {
            if self.check_punct(Punctuation::LParen) {
                depth += 1;
            } else if self.check_punct(Punctuation::RParen) {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return;
                }
            }
            self.advance();
        }
    }
}
