//! T-SQL query parsing

mod batch;
mod identifier_utils;
mod lexer;
mod parse_error;
mod select_parser;
mod token;
mod token_parser_base;

pub use batch::{split_batches, Batch};
pub use identifier_utils::{normalize_identifier, split_qualified_name};
pub use lexer::{tokenize, tokenize_at, Lexer, TokenStream};
pub use parse_error::{ParseError, ParseErrorKind};
pub use select_parser::SelectParser;
pub use token::{Keyword, Location, Operator, Punctuation, Token, TokenKind};

use crate::ast::{Script, SelectStatement};

/// A best-effort syntax tree together with every problem found on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    pub script: Script,
    /// Lexical and syntax errors ordered by source offset.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// The first query in the script, if any statement could be produced.
    pub fn first_statement(&self) -> Option<&SelectStatement> {
        self.script.statements.first()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse SQL text into a [`Script`].
///
/// `GO` lines split the text into batches that are parsed separately.
/// Parsing never fails: problems are reported through
/// [`ParseResult::errors`].
pub fn parse(sql: &str) -> ParseResult {
    parse_tokens(tokenize(sql))
}

/// Parse an already lexed token stream, batch by batch.
pub fn parse_tokens(stream: TokenStream) -> ParseResult {
    let mut result = ParseResult {
        script: Script::default(),
        errors: stream.errors,
    };

    for batch in split_batches(stream.tokens) {
        let batch_result = SelectParser::new(TokenStream {
            tokens: batch.tokens,
            errors: Vec::new(),
        })
        .parse_script();
        result
            .script
            .statements
            .extend(batch_result.script.statements);
        result.errors.extend(batch_result.errors);
    }

    result.errors.sort_by_key(|e| e.location.offset);
    result
}
