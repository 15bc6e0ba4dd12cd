//! T-SQL lexer.
//!
//! Turns query text into [`Token`]s. The lexer never fails: characters it
//! does not understand become [`TokenKind::Unknown`] tokens and a lexical
//! [`ParseError`] is recorded on the side, so the parser can still produce a
//! best-effort tree. Whitespace and comments are skipped.

use super::parse_error::ParseError;
use super::token::{Keyword, Location, Operator, Punctuation, Token, TokenKind};

/// Fully materialized lexer output.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    /// Tokens in source order, always terminated by a single `Eof` token.
    pub tokens: Vec<Token>,
    /// Lexical errors, in source order.
    pub errors: Vec<ParseError>,
}

/// Tokenize a complete SQL text.
pub fn tokenize(sql: &str) -> TokenStream {
    tokenize_at(sql, Location::new(0, 1, 1))
}

/// Tokenize a fragment of a larger script that starts at `origin`.
///
/// Token locations are reported relative to the whole script.
pub fn tokenize_at(sql: &str, origin: Location) -> TokenStream {
    let mut lexer = Lexer::with_origin(sql, origin);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    TokenStream {
        tokens,
        errors: lexer.into_errors(),
    }
}

/// Lazy tokenizer. Yields tokens until (and including) `Eof`, then `None`.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    base_offset: usize,
    line: usize,
    column: usize,
    finished: bool,
    errors: Vec<ParseError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_origin(source, Location::new(0, 1, 1))
    }

    pub fn with_origin(source: &'a str, origin: Location) -> Self {
        Self {
            source,
            pos: 0,
            base_offset: origin.offset,
            line: origin.line,
            column: origin.column,
            finished: false,
            errors: Vec::new(),
        }
    }

    /// Lexical errors recorded so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    // ========================================================================
    // Character navigation
    // ========================================================================

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
    }

    #[inline]
    fn location(&self) -> Location {
        Location::new(self.base_offset + self.pos, self.line, self.column)
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    /// Skip whitespace, `--` line comments and (nested) `/* */` block comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek_char(), self.peek_nth(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('-'), Some('-')) => self.bump_while(|c| c != '\n'),
                (Some('/'), Some('*')) => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.location();
        self.bump();
        self.bump();
        let mut depth = 1;
        while depth > 0 {
            match (self.peek_char(), self.peek_nth(1)) {
                (None, _) => {
                    self.errors
                        .push(ParseError::lexical("unterminated block comment", start));
                    return;
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.bump();
                    self.bump();
                    depth -= 1;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    // ========================================================================
    // Token scanning
    // ========================================================================

    fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start_pos = self.pos;
        let start = self.location();
        let Some(c) = self.peek_char() else {
            return Token::new(TokenKind::Eof, "", start);
        };

        let kind = match c {
            '[' => self.scan_delimited(']', start),
            '"' => self.scan_delimited('"', start),
            '\'' => self.scan_string(start),
            'N' | 'n' if self.peek_nth(1) == Some('\'') => {
                self.bump();
                self.scan_string(start)
            }
            '0' if matches!(self.peek_nth(1), Some('x') | Some('X')) => {
                self.bump();
                self.bump();
                self.bump_while(|c| c.is_ascii_hexdigit());
                TokenKind::NumberLiteral
            }
            c if c.is_ascii_digit() => self.scan_number(),
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            '@' => self.scan_variable(start),
            c if is_identifier_start(c) => {
                self.bump_while(is_identifier_part);
                let word = &self.source[start_pos..self.pos];
                if word.eq_ignore_ascii_case("GO") && self.is_separator_line(start_pos) {
                    self.bump_while(|c| c != '\n');
                    let text = self.source[start_pos..self.pos].trim_end();
                    return Token::new(TokenKind::BatchSeparator, text, start);
                }
                match Keyword::lookup(word) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Identifier,
                }
            }
            '*' => {
                self.bump();
                TokenKind::Star
            }
            ',' | '(' | ')' | '.' | ';' => {
                self.bump();
                TokenKind::Punctuation(match c {
                    ',' => Punctuation::Comma,
                    '(' => Punctuation::LParen,
                    ')' => Punctuation::RParen,
                    '.' => Punctuation::Period,
                    _ => Punctuation::Semicolon,
                })
            }
            _ => self.scan_operator(c, start),
        };

        Token::new(kind, &self.source[start_pos..self.pos], start)
    }

    /// True if the word starting at `word_start` and ending at the cursor is
    /// alone on its line, apart from whitespace and one trailing `;`.
    fn is_separator_line(&self, word_start: usize) -> bool {
        let before = &self.source[..word_start];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        if !before[line_start..].trim().is_empty() {
            return false;
        }
        let after = &self.source[self.pos..];
        let line_end = after.find('\n').unwrap_or(after.len());
        let rest = after[..line_end].trim();
        rest.is_empty() || rest == ";"
    }

    /// `[name]` or `"name"`, with the closing delimiter escaped by doubling.
    fn scan_delimited(&mut self, close: char, start: Location) -> TokenKind {
        self.bump();
        let mut empty = true;
        loop {
            match self.bump() {
                None => {
                    self.errors.push(ParseError::lexical(
                        format!("unterminated delimited identifier, expected `{}`", close),
                        start,
                    ));
                    return TokenKind::Unknown;
                }
                Some(c) if c == close => {
                    if self.peek_char() == Some(close) {
                        self.bump();
                        empty = false;
                    } else {
                        break;
                    }
                }
                Some(_) => empty = false,
            }
        }
        if empty {
            self.errors
                .push(ParseError::lexical("empty delimited identifier", start));
            return TokenKind::Unknown;
        }
        TokenKind::Identifier
    }

    /// `'text'` with `''` escapes. The optional `N` prefix is already consumed.
    fn scan_string(&mut self, start: Location) -> TokenKind {
        self.bump();
        loop {
            match self.bump() {
                None => {
                    self.errors
                        .push(ParseError::lexical("unterminated string literal", start));
                    return TokenKind::Unknown;
                }
                Some('\'') => {
                    if self.peek_char() == Some('\'') {
                        self.bump();
                    } else {
                        return TokenKind::StringLiteral;
                    }
                }
                Some(_) => {}
            }
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        self.bump_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let exponent_follows = match self.peek_nth(1) {
                Some('+') | Some('-') => self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_follows {
                self.bump();
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    self.bump();
                }
                self.bump_while(|c| c.is_ascii_digit());
            }
        }
        TokenKind::NumberLiteral
    }

    fn scan_variable(&mut self, start: Location) -> TokenKind {
        self.bump();
        if self.peek_char() == Some('@') {
            self.bump();
        }
        let name_start = self.pos;
        self.bump_while(is_identifier_part);
        if self.pos == name_start {
            self.errors
                .push(ParseError::lexical("expected variable name after `@`", start));
            return TokenKind::Unknown;
        }
        TokenKind::Variable
    }

    fn scan_operator(&mut self, c: char, start: Location) -> TokenKind {
        self.bump();
        let op = match c {
            '=' => Operator::Eq,
            '<' => match self.peek_char() {
                Some('=') => {
                    self.bump();
                    Operator::LtEq
                }
                Some('>') => {
                    self.bump();
                    Operator::NotEq
                }
                _ => Operator::Lt,
            },
            '>' => {
                if self.peek_char() == Some('=') {
                    self.bump();
                    Operator::GtEq
                } else {
                    Operator::Gt
                }
            }
            '!' => match self.peek_char() {
                Some('=') => {
                    self.bump();
                    Operator::NotEq
                }
                Some('<') => {
                    self.bump();
                    Operator::NotLt
                }
                Some('>') => {
                    self.bump();
                    Operator::NotGt
                }
                _ => return self.unknown(c, start),
            },
            '+' => Operator::Plus,
            '-' => Operator::Minus,
            '/' => Operator::Slash,
            '%' => Operator::Percent,
            '&' => Operator::Ampersand,
            '|' => Operator::Pipe,
            '^' => Operator::Caret,
            '~' => Operator::Tilde,
            _ => return self.unknown(c, start),
        };
        TokenKind::Operator(op)
    }

    fn unknown(&mut self, c: char, start: Location) -> TokenKind {
        self.errors
            .push(ParseError::lexical(format!("unexpected character `{}`", c), start));
        TokenKind::Unknown
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.finished = true;
        }
        Some(token)
    }
}

#[inline]
fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '#'
}

#[inline]
fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '@' | '#' | '$')
}
