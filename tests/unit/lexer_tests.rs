//! Unit tests for the T-SQL lexer

use query_disassembler::parser::{
    tokenize, Keyword, Lexer, Location, Operator, ParseErrorKind, Punctuation, TokenKind,
};

fn kinds(sql: &str) -> Vec<TokenKind> {
    tokenize(sql).tokens.into_iter().map(|t| t.kind).collect()
}

fn texts(sql: &str) -> Vec<String> {
    tokenize(sql)
        .tokens
        .into_iter()
        .filter(|t| !t.is_eof())
        .map(|t| t.text)
        .collect()
}

// ============================================================================
// Token kinds
// ============================================================================

#[test]
fn test_select_statement_tokens() {
    assert_eq!(
        kinds("SELECT a, [b c] FROM dbo.T;"),
        vec![
            TokenKind::Keyword(Keyword::Select),
            TokenKind::Identifier,
            TokenKind::Punctuation(Punctuation::Comma),
            TokenKind::Identifier,
            TokenKind::Keyword(Keyword::From),
            TokenKind::Identifier,
            TokenKind::Punctuation(Punctuation::Period),
            TokenKind::Identifier,
            TokenKind::Punctuation(Punctuation::Semicolon),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        kinds("select SeLeCt SELECT")[..3],
        [TokenKind::Keyword(Keyword::Select); 3]
    );
}

#[test]
fn test_delimited_identifiers_are_never_keywords() {
    assert_eq!(
        kinds("[select] \"from\"")[..2],
        [TokenKind::Identifier, TokenKind::Identifier]
    );
}

#[test]
fn test_comparison_operators() {
    assert_eq!(
        kinds("= <> != < > <= >= !< !>")
            .into_iter()
            .filter(|k| *k != TokenKind::Eof)
            .collect::<Vec<_>>(),
        vec![
            TokenKind::Operator(Operator::Eq),
            TokenKind::Operator(Operator::NotEq),
            TokenKind::Operator(Operator::NotEq),
            TokenKind::Operator(Operator::Lt),
            TokenKind::Operator(Operator::Gt),
            TokenKind::Operator(Operator::LtEq),
            TokenKind::Operator(Operator::GtEq),
            TokenKind::Operator(Operator::NotLt),
            TokenKind::Operator(Operator::NotGt),
        ]
    );
}

#[test]
fn test_literals_and_variables() {
    assert_eq!(
        kinds("N'it''s' 42 3.14 .5 1e10 0x1F @id @@ROWCOUNT #temp"),
        vec![
            TokenKind::StringLiteral,
            TokenKind::NumberLiteral,
            TokenKind::NumberLiteral,
            TokenKind::NumberLiteral,
            TokenKind::NumberLiteral,
            TokenKind::NumberLiteral,
            TokenKind::Variable,
            TokenKind::Variable,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_star_token() {
    assert_eq!(kinds("*")[0], TokenKind::Star);
}

// ============================================================================
// Comments and text
// ============================================================================

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        texts("SELECT /* a /* nested */ comment */ a -- trailing\nFROM T"),
        vec!["SELECT", "a", "FROM", "T"]
    );
}

#[test]
fn test_raw_text_is_preserved() {
    assert_eq!(texts("[dbo].[My Table]"), vec!["[dbo]", ".", "[My Table]"]);
}

// ============================================================================
// Locations
// ============================================================================

#[test]
fn test_locations_track_lines() {
    let stream = tokenize("SELECT a\n  FROM T");
    let from = &stream.tokens[2];
    assert_eq!(from.text, "FROM");
    assert_eq!(from.location, Location::new(11, 2, 3));
}

#[test]
fn test_offsets_strictly_increase() {
    let stream = tokenize("SELECT a.b, COUNT(*) FROM [T] WHERE x <> N'y' -- c\n;");
    let offsets: Vec<usize> = stream.tokens.iter().map(|t| t.location.offset).collect();
    assert!(
        offsets.windows(2).all(|w| w[0] < w[1]),
        "offsets not increasing: {:?}",
        offsets
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_string_is_lexical_error() {
    let stream = tokenize("SELECT 'abc");
    assert_eq!(stream.errors.len(), 1);
    assert_eq!(stream.errors[0].kind, ParseErrorKind::Lexical);
    assert_eq!(stream.errors[0].location.offset, 7);
}

#[test]
fn test_unterminated_bracket_is_lexical_error() {
    let stream = tokenize("SELECT [abc");
    assert_eq!(stream.errors.len(), 1);
    assert_eq!(stream.errors[0].kind, ParseErrorKind::Lexical);
}

#[test]
fn test_empty_bracket_is_lexical_error() {
    let stream = tokenize("SELECT [] FROM T");
    assert_eq!(stream.errors.len(), 1);
    assert!(!stream
        .tokens
        .iter()
        .any(|t| t.kind == TokenKind::Identifier && t.text == "[]"));
}

#[test]
fn test_unknown_character_is_reported() {
    let stream = tokenize("SELECT a ? b");
    assert_eq!(stream.errors.len(), 1);
    assert!(stream.tokens.iter().any(|t| t.kind == TokenKind::Unknown));
}

#[test]
fn test_lexer_iterator_ends_after_eof() {
    let mut lexer = Lexer::new("a");
    assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Identifier));
    assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Eof));
    assert!(lexer.next().is_none());
    assert!(lexer.errors().is_empty());
}
