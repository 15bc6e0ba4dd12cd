//! Recursive-descent parser for T-SQL queries.
//!
//! The parser is tolerant: a grammar violation records a syntax
//! [`ParseError`] and the parser synchronises on the next list separator,
//! clause keyword, closing parenthesis or statement terminator before
//! carrying on. Callers always get a best-effort [`Script`].

use super::lexer::TokenStream;
use super::parse_error::{ParseError, ParseErrorKind};
use super::token::{Keyword, Operator, Punctuation, Token, TokenKind};
use super::token_parser_base::TokenParser;
use super::ParseResult;
use crate::ast::{
    BinaryOperator, ColumnKind, ColumnReference, CommonTableExpression, DerivedTable, Expression,
    Identifier, JoinKind, JoinedTable, Literal, MultiPartIdentifier, NamedTable, OrderByItem,
    Script, SelectItem, SelectStatement, SetOperation, SetOperator, TableFunction, TableReference,
    TopClause, UnaryOperator, VariableTable, WhenClause, WindowSpec,
};

/// Keywords that end the clause currently being parsed.
const CLAUSE_KEYWORDS: &[Keyword] = &[
    Keyword::Select,
    Keyword::Into,
    Keyword::From,
    Keyword::Where,
    Keyword::Group,
    Keyword::Having,
    Keyword::Order,
    Keyword::Union,
    Keyword::Except,
    Keyword::Intersect,
    Keyword::For,
    Keyword::Option,
];

/// Keywords that can start a join operator.
const JOIN_KEYWORDS: &[Keyword] = &[
    Keyword::Join,
    Keyword::Inner,
    Keyword::Left,
    Keyword::Right,
    Keyword::Full,
    Keyword::Cross,
    Keyword::Outer,
];

/// How deeply expressions, subqueries and parenthesized table sources may
/// nest before the rest of the group is skipped.
const MAX_NESTING_DEPTH: usize = 40;

/// Built-ins that are called without parentheses.
const NILADIC_FUNCTIONS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_USER",
    "SESSION_USER",
    "SYSTEM_USER",
    "USER",
];

fn is_clause_boundary(token: &Token) -> bool {
    match token.kind {
        TokenKind::Eof
        | TokenKind::Punctuation(Punctuation::Semicolon)
        | TokenKind::Punctuation(Punctuation::RParen) => true,
        TokenKind::Keyword(k) => CLAUSE_KEYWORDS.contains(&k) || k.starts_other_statement(),
        _ => false,
    }
}

fn is_list_boundary(token: &Token) -> bool {
    token.kind == TokenKind::Punctuation(Punctuation::Comma) || is_clause_boundary(token)
}

fn is_table_boundary(token: &Token) -> bool {
    is_list_boundary(token)
        || matches!(token.kind, TokenKind::Keyword(k) if JOIN_KEYWORDS.contains(&k) || k == Keyword::On)
}

/// ORDER BY items also end at `OFFSET` and at window frame clauses.
fn is_order_by_boundary(token: &Token) -> bool {
    is_list_boundary(token)
        || (token.kind == TokenKind::Identifier
            && ["OFFSET", "ROWS", "RANGE"]
                .iter()
                .any(|w| token.text.eq_ignore_ascii_case(w)))
}

/// Stops only at the `)` closing the enclosing group, or at end of input.
fn is_group_end(_: &Token) -> bool {
    false
}

fn describe(token: &Token) -> String {
    if token.is_eof() {
        "end of input".to_string()
    } else {
        format!("`{}`", token.text)
    }
}

/// Unquote a string literal, dropping the `N` prefix and `''` escapes.
fn string_literal_value(text: &str) -> String {
    let text = text
        .strip_prefix('N')
        .or_else(|| text.strip_prefix('n'))
        .unwrap_or(text);
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text);
    inner.replace("''", "'")
}

/// Parser for scripts made of `SELECT` queries.
pub struct SelectParser {
    base: TokenParser,
    errors: Vec<ParseError>,
    depth: usize,
}

impl SelectParser {
    /// Create a parser over one batch of lexer output. Lexical errors are
    /// carried over.
    pub fn new(stream: TokenStream) -> Self {
        Self {
            base: TokenParser::from_tokens(stream.tokens),
            errors: stream.errors,
            depth: 0,
        }
    }

    /// Parse every statement in the stream.
    pub fn parse_script(mut self) -> ParseResult {
        let mut statements = Vec::new();

        loop {
            while self.base.expect_punct(Punctuation::Semicolon).is_some() {}
            if self.base.is_at_end() {
                break;
            }

            let start = self.base.pos();
            if self.starts_query() {
                if let Some(statement) = self.parse_query_statement() {
                    statements.push(statement);
                }
                if !self.at_statement_end() {
                    self.error_unexpected("end of statement");
                    self.skip_to_next_statement();
                }
            } else {
                let token = self.base.current_token();
                let message = match token.kind {
                    TokenKind::Keyword(k) if k.starts_other_statement() => {
                        format!("unsupported statement {}, expected SELECT", describe(token))
                    }
                    _ => format!("expected SELECT, found {}", describe(token)),
                };
                self.error(message);
                self.base.advance();
                self.skip_to_next_statement();
            }

            if self.base.pos() == start {
                self.base.advance();
            }
        }

        let mut errors = self.errors;
        errors.sort_by_key(|e| e.location.offset);
        ParseResult {
            script: Script { statements },
            errors,
        }
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    /// Record a syntax error at the current token. A token gets at most one.
    fn error(&mut self, message: impl Into<String>) {
        let location = self.base.location();
        let reported = self
            .errors
            .last()
            .is_some_and(|e| e.kind == ParseErrorKind::Syntax && e.location == location);
        if !reported {
            self.errors.push(ParseError::syntax(message, location));
        }
    }

    fn error_expected(&mut self, expected: &str) {
        let found = describe(self.base.current_token());
        self.error(format!("expected {}, found {}", expected, found));
    }

    fn error_unexpected(&mut self, expected: &str) {
        let found = describe(self.base.current_token());
        self.error(format!("unexpected {}, expected {}", found, expected));
    }

    fn expect_keyword_or_error(&mut self, keyword: Keyword, expected: &str) -> Option<()> {
        let found = self.base.expect_keyword(keyword);
        if found.is_none() {
            self.error_expected(expected);
        }
        found
    }

    fn expect_punct_or_error(&mut self, punct: Punctuation, expected: &str) -> Option<()> {
        let found = self.base.expect_punct(punct);
        if found.is_none() {
            self.error_expected(expected);
        }
        found
    }

    /// Consume the `)` that closes a group, skipping anything left inside it.
    fn close_paren(&mut self) {
        if self.base.expect_punct(Punctuation::RParen).is_some() {
            return;
        }
        self.error_expected("`)`");
        self.base.skip_until(is_group_end);
        self.base.expect_punct(Punctuation::RParen);
    }

    fn at_statement_end(&self) -> bool {
        self.base.is_at_end()
            || self.base.check_punct(Punctuation::Semicolon)
            || self.starts_query()
            || matches!(self.base.current_kind(), TokenKind::Keyword(k) if k.starts_other_statement())
    }

    /// Skip to the next `;` or `SELECT` outside parentheses, stepping over
    /// stray closing parentheses.
    fn skip_to_next_statement(&mut self) {
        loop {
            self.base.skip_until(|t| {
                matches!(
                    t.kind,
                    TokenKind::Punctuation(Punctuation::Semicolon)
                        | TokenKind::Keyword(Keyword::Select)
                )
            });
            if self.base.check_punct(Punctuation::RParen) {
                self.base.advance();
                continue;
            }
            return;
        }
    }

    /// After a list element: report anything that is not a boundary and skip
    /// past it. Returns true if a `,` follows and the list continues.
    fn finish_list_item(&mut self, parsed: bool, boundary: fn(&Token) -> bool) -> bool {
        if parsed && !boundary(self.base.current_token()) {
            self.error_unexpected("`,` or end of list");
        }
        self.base.skip_until(boundary);
        self.base.expect_punct(Punctuation::Comma).is_some()
    }

    /// After a clause body: report and skip anything up to the next clause.
    fn finish_clause(&mut self, parsed: bool) {
        if parsed && !is_clause_boundary(self.base.current_token()) {
            self.error_unexpected("end of clause");
        }
        self.base.skip_until(is_clause_boundary);
    }

    /// Run `parse` one nesting level deeper. Past [`MAX_NESTING_DEPTH`] an
    /// error is recorded and tokens are skipped up to `skip` instead.
    fn nested<T>(
        &mut self,
        skip: fn(&Token) -> bool,
        parse: fn(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error("nesting too deep");
            self.base.skip_until(skip);
            return None;
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// `SELECT`, `WITH`, or parentheses opening a query.
    fn starts_query(&self) -> bool {
        match self.base.current_kind() {
            TokenKind::Keyword(Keyword::Select) => true,
            TokenKind::Keyword(Keyword::With) => {
                self.base.peek(1).kind == TokenKind::Identifier
            }
            TokenKind::Punctuation(Punctuation::LParen) => self.parens_then_query(),
            _ => false,
        }
    }

    /// True if the current `(` opens a subquery.
    fn paren_then_query(&self) -> bool {
        self.base.check_punct(Punctuation::LParen)
            && matches!(
                self.base.peek(1).kind,
                TokenKind::Keyword(Keyword::Select) | TokenKind::Keyword(Keyword::With)
            )
    }

    /// True if one or more `(` are followed by `SELECT` or `WITH`. Only
    /// used where a query is expected, so `((SELECT 1) UNION (SELECT 2))`
    /// is read as a query.
    fn parens_then_query(&self) -> bool {
        let mut offset = 0;
        while self.base.peek(offset).kind == TokenKind::Punctuation(Punctuation::LParen) {
            offset += 1;
        }
        offset > 0
            && matches!(
                self.base.peek(offset).kind,
                TokenKind::Keyword(Keyword::Select) | TokenKind::Keyword(Keyword::With)
            )
    }

    /// `[WITH cte, ...] query_expression`
    fn parse_query_statement(&mut self) -> Option<SelectStatement> {
        self.nested(is_group_end, Self::parse_query_statement_inner)
    }

    fn parse_query_statement_inner(&mut self) -> Option<SelectStatement> {
        let location = self.base.location();
        let ctes = if self.base.check_keyword(Keyword::With) {
            self.parse_ctes()
        } else {
            Vec::new()
        };

        let mut statement = match self.parse_query_expression() {
            Some(statement) => statement,
            None if !ctes.is_empty() => SelectStatement {
                location,
                ..Default::default()
            },
            None => return None,
        };
        statement.ctes = ctes;
        Some(statement)
    }

    fn parse_ctes(&mut self) -> Vec<CommonTableExpression> {
        self.base.advance();
        let mut ctes = Vec::new();

        loop {
            let Some(name) = self.base.parse_identifier() else {
                self.error_expected("common table expression name");
                self.base.skip_until(|t| t.kind == TokenKind::Keyword(Keyword::Select));
                return ctes;
            };

            let columns = if self.base.check_punct(Punctuation::LParen) {
                self.parse_identifier_list()
            } else {
                Vec::new()
            };

            if self.expect_keyword_or_error(Keyword::As, "AS").is_none()
                || self.expect_punct_or_error(Punctuation::LParen, "`(`").is_none()
            {
                self.base.skip_until(|t| t.kind == TokenKind::Keyword(Keyword::Select));
                return ctes;
            }

            let query = if self.starts_query() {
                self.parse_query_statement()
            } else {
                self.error_expected("SELECT");
                None
            };
            self.close_paren();

            if let Some(query) = query {
                ctes.push(CommonTableExpression {
                    name,
                    columns,
                    query: Box::new(query),
                });
            }

            if self.base.expect_punct(Punctuation::Comma).is_none() {
                return ctes;
            }
        }
    }

    /// `query_term [UNION [ALL] | EXCEPT | INTERSECT query_expression]`
    fn parse_query_expression(&mut self) -> Option<SelectStatement> {
        let mut statement = self.parse_query_term()?;

        let operator = match self.base.current_kind() {
            TokenKind::Keyword(Keyword::Union) => {
                self.base.advance();
                if self.base.expect_keyword(Keyword::All).is_some() {
                    SetOperator::UnionAll
                } else {
                    SetOperator::Union
                }
            }
            TokenKind::Keyword(Keyword::Except) => {
                self.base.advance();
                SetOperator::Except
            }
            TokenKind::Keyword(Keyword::Intersect) => {
                self.base.advance();
                SetOperator::Intersect
            }
            _ => return Some(statement),
        };

        if let Some(right) = self.parse_query_expression() {
            statement.set_operation = Some(Box::new(SetOperation { operator, right }));
        }
        Some(statement)
    }

    /// `SELECT ...` or `( query )`
    fn parse_query_term(&mut self) -> Option<SelectStatement> {
        if self.base.check_keyword(Keyword::Select) {
            return Some(self.parse_select_specification());
        }
        if self.base.check_punct(Punctuation::LParen) && self.parens_then_query() {
            self.base.advance();
            let inner = self.parse_query_statement();
            self.close_paren();
            return inner;
        }
        self.error_expected("SELECT");
        None
    }

    fn parse_select_specification(&mut self) -> SelectStatement {
        let mut select = SelectStatement {
            location: self.base.location(),
            ..Default::default()
        };
        self.base.advance();

        if self.base.expect_keyword(Keyword::Distinct).is_some() {
            select.distinct = true;
        } else {
            self.base.expect_keyword(Keyword::All);
        }
        if self.base.check_keyword(Keyword::Top) {
            select.top = self.parse_top();
        }

        select.projections = self.parse_projection_list();

        if self.base.expect_keyword(Keyword::Into).is_some() {
            select.into = self.parse_multipart_name();
            self.finish_clause(select.into.is_some());
        }

        if self.base.expect_keyword(Keyword::From).is_some() {
            select.from = self.parse_from_list();
        }

        if self.base.expect_keyword(Keyword::Where).is_some() {
            select.where_clause = self.parse_expression();
            self.finish_clause(select.where_clause.is_some());
        }

        if self.base.expect_keyword(Keyword::Group).is_some() {
            if self.expect_keyword_or_error(Keyword::By, "BY").is_some() {
                self.base.expect_keyword(Keyword::All);
                select.group_by = self.parse_expression_list();
            }
            self.finish_clause(true);
        }

        if self.base.expect_keyword(Keyword::Having).is_some() {
            select.having = self.parse_expression();
            self.finish_clause(select.having.is_some());
        }

        if self.base.expect_keyword(Keyword::Order).is_some() {
            if self.expect_keyword_or_error(Keyword::By, "BY").is_some() {
                select.order_by = self.parse_order_by_list();
            }
            if self.base.expect_word_ci("OFFSET").is_some() {
                // OFFSET n ROWS [FETCH NEXT m ROWS ONLY]; row counts only.
                self.base.skip_until(is_clause_boundary);
            }
            self.finish_clause(true);
        }

        // FOR XML/JSON/BROWSE and OPTION (...) carry no table or column references.
        if self.base.expect_keyword(Keyword::For).is_some() {
            self.base.skip_until(|t| {
                is_clause_boundary(t) && t.kind != TokenKind::Keyword(Keyword::For)
            });
        }
        if self.base.expect_keyword(Keyword::Option).is_some() {
            if self.base.check_punct(Punctuation::LParen) {
                self.base.skip_parenthesized();
            } else {
                self.error_expected("`(`");
            }
        }

        select
    }

    /// `TOP n | TOP (expr)` followed by optional `PERCENT` and `WITH TIES`.
    fn parse_top(&mut self) -> Option<TopClause> {
        self.base.advance();
        let quantity = if self.base.expect_punct(Punctuation::LParen).is_some() {
            let expr = self.parse_expression();
            self.close_paren();
            expr
        } else {
            self.parse_primary()
        }?;

        let percent = self.base.expect_keyword(Keyword::Percent).is_some();
        let with_ties = if self.base.check_keyword(Keyword::With)
            && self.base.peek(1).kind == TokenKind::Identifier
            && self.base.peek(1).text.eq_ignore_ascii_case("TIES")
        {
            self.base.advance();
            self.base.advance();
            true
        } else {
            false
        };

        Some(TopClause {
            quantity,
            percent,
            with_ties,
        })
    }

    // ========================================================================
    // Projection list
    // ========================================================================

    fn parse_projection_list(&mut self) -> Vec<SelectItem> {
        let mut items = Vec::new();
        if is_clause_boundary(self.base.current_token()) {
            self.error_expected("select list");
            return items;
        }

        loop {
            let item = self.parse_select_item();
            let parsed = item.is_some();
            items.extend(item);
            if !self.finish_list_item(parsed, is_list_boundary) {
                return items;
            }
        }
    }

    fn parse_select_item(&mut self) -> Option<SelectItem> {
        if self.base.check_kind(TokenKind::Star) {
            let location = self.base.location();
            self.base.advance();
            return Some(SelectItem::Wildcard { location });
        }

        let next_is_assignment =
            self.base.peek(1).kind == TokenKind::Operator(Operator::Eq);

        // T-SQL `alias = expr`
        if self.base.check_kind(TokenKind::Identifier) && next_is_assignment {
            let alias = self.base.parse_identifier();
            self.base.advance();
            let expr = self.parse_expression()?;
            return Some(SelectItem::Expression { expr, alias });
        }

        // `@variable = expr` assigns instead of projecting; keep the expression.
        if self.base.check_kind(TokenKind::Variable) && next_is_assignment {
            self.base.advance();
            self.base.advance();
            let expr = self.parse_expression()?;
            return Some(SelectItem::Expression { expr, alias: None });
        }

        if let Some(column) = self.parse_qualified_wildcard() {
            return Some(SelectItem::QualifiedWildcard(column));
        }

        let expr = self.parse_expression()?;
        let alias = self.parse_column_alias();
        Some(SelectItem::Expression { expr, alias })
    }

    /// `a.b.*`, or `None` (position unchanged) if the item is something else.
    fn parse_qualified_wildcard(&mut self) -> Option<ColumnReference> {
        let mut offset = 0;
        loop {
            if self.base.peek(offset).kind != TokenKind::Identifier
                || self.base.peek(offset + 1).kind != TokenKind::Punctuation(Punctuation::Period)
            {
                return None;
            }
            if self.base.peek(offset + 2).kind == TokenKind::Star {
                break;
            }
            offset += 2;
        }

        let location = self.base.location();
        let mut parts = Vec::new();
        while let Some(part) = self.base.parse_identifier() {
            parts.push(part);
            self.base.advance();
        }
        // Step over the `*`.
        self.base.advance();

        Some(ColumnReference {
            identifier: MultiPartIdentifier::from_parts(parts),
            kind: ColumnKind::Wildcard,
            location,
        })
    }

    /// `[AS] alias`, where the alias may also be a string literal.
    fn parse_column_alias(&mut self) -> Option<Identifier> {
        let explicit = self.base.expect_keyword(Keyword::As).is_some();
        let token = self.base.current_token();
        match token.kind {
            TokenKind::Identifier => self.base.parse_identifier(),
            TokenKind::StringLiteral => {
                let alias = Identifier {
                    value: string_literal_value(&token.text),
                    quote_style: Some('\''),
                    location: token.location,
                };
                self.base.advance();
                Some(alias)
            }
            _ => {
                if explicit {
                    self.error_expected("alias");
                }
                None
            }
        }
    }

    // ========================================================================
    // FROM clause
    // ========================================================================

    fn parse_from_list(&mut self) -> Vec<TableReference> {
        let mut tables = Vec::new();
        loop {
            let table = self.parse_table_source();
            let parsed = table.is_some();
            tables.extend(table);
            if !self.finish_list_item(parsed, is_list_boundary) {
                return tables;
            }
        }
    }

    /// `table_ref { join_clause }`
    fn parse_table_source(&mut self) -> Option<TableReference> {
        let mut left = self.parse_table_ref()?;

        while let Some(kind) = self.parse_join_operator() {
            let Some(right) = self.parse_table_ref() else {
                self.base.skip_until(is_table_boundary);
                if self.base.check_keyword(Keyword::On) {
                    self.base.advance();
                    self.parse_expression();
                }
                continue;
            };

            let condition = match kind {
                JoinKind::Cross | JoinKind::CrossApply | JoinKind::OuterApply => None,
                _ => {
                    if self.expect_keyword_or_error(Keyword::On, "ON").is_some() {
                        let condition = self.parse_expression();
                        if condition.is_none() {
                            self.base.skip_until(is_table_boundary);
                        }
                        condition
                    } else {
                        None
                    }
                }
            };

            left = TableReference::Joined(JoinedTable {
                left: Box::new(left),
                right: Box::new(right),
                kind,
                condition,
            });
        }

        Some(left)
    }

    /// Consume a join operator, if one follows.
    fn parse_join_operator(&mut self) -> Option<JoinKind> {
        let next = self.base.peek(1);
        let next_is_apply =
            next.kind == TokenKind::Identifier && next.text.eq_ignore_ascii_case("APPLY");

        let kind = match self.base.current_kind() {
            TokenKind::Keyword(Keyword::Join) => JoinKind::Inner,
            TokenKind::Keyword(Keyword::Inner) => JoinKind::Inner,
            TokenKind::Keyword(Keyword::Left) => JoinKind::LeftOuter,
            TokenKind::Keyword(Keyword::Right) => JoinKind::RightOuter,
            TokenKind::Keyword(Keyword::Full) => JoinKind::FullOuter,
            TokenKind::Keyword(Keyword::Cross) if next_is_apply => {
                self.base.advance();
                self.base.advance();
                return Some(JoinKind::CrossApply);
            }
            TokenKind::Keyword(Keyword::Outer) if next_is_apply => {
                self.base.advance();
                self.base.advance();
                return Some(JoinKind::OuterApply);
            }
            TokenKind::Keyword(Keyword::Cross) => JoinKind::Cross,
            _ => return None,
        };

        if self.base.check_keyword(Keyword::Join) {
            self.base.advance();
            return Some(kind);
        }

        self.base.advance();
        self.base.expect_keyword(Keyword::Outer);
        // Join hints: INNER HASH JOIN, LEFT LOOP JOIN, ...
        if self.base.check_keyword(Keyword::Merge)
            || self.base.check_word_ci("HASH")
            || self.base.check_word_ci("LOOP")
            || self.base.check_word_ci("REMOTE")
        {
            self.base.advance();
        }
        self.expect_keyword_or_error(Keyword::Join, "JOIN");
        Some(kind)
    }

    fn parse_table_ref(&mut self) -> Option<TableReference> {
        match self.base.current_kind() {
            TokenKind::Punctuation(Punctuation::LParen) if self.paren_then_query() => {
                self.parse_derived_table()
            }
            TokenKind::Punctuation(Punctuation::LParen) => {
                self.base.advance();
                let inner = self.nested(is_group_end, Self::parse_table_source);
                self.close_paren();
                inner.map(|t| TableReference::Parenthesized(Box::new(t)))
            }
            TokenKind::Variable => {
                let name = self.base.current_token().text.clone();
                self.base.advance();
                let alias = self.parse_table_alias();
                Some(TableReference::Variable(VariableTable { name, alias }))
            }
            TokenKind::Identifier => {
                let name = self.parse_multipart_name()?;
                if self.base.check_punct(Punctuation::LParen) {
                    let args = self.parse_parenthesized_arguments();
                    let alias = self.parse_table_alias();
                    return Some(TableReference::Function(TableFunction { name, args, alias }));
                }
                let alias = self.parse_table_alias();
                self.skip_table_hints();
                Some(TableReference::Named(NamedTable {
                    schema_object: name,
                    alias,
                }))
            }
            _ => {
                self.error_expected("table reference");
                None
            }
        }
    }

    fn parse_derived_table(&mut self) -> Option<TableReference> {
        self.base.advance();
        let subquery = self.parse_query_statement();
        self.close_paren();

        let alias = self.parse_table_alias();
        if alias.is_none() {
            self.error_expected("derived table alias");
        }
        let column_aliases = if self.base.check_punct(Punctuation::LParen) {
            self.parse_identifier_list()
        } else {
            Vec::new()
        };

        subquery.map(|subquery| {
            TableReference::Derived(DerivedTable {
                subquery: Box::new(subquery),
                alias,
                column_aliases,
            })
        })
    }

    fn parse_table_alias(&mut self) -> Option<Identifier> {
        if self.base.expect_keyword(Keyword::As).is_some() {
            let alias = self.base.parse_identifier();
            if alias.is_none() {
                self.error_expected("alias");
            }
            return alias;
        }
        if self.base.check_word_ci("TABLESAMPLE") {
            return None;
        }
        self.base.parse_identifier()
    }

    /// `WITH (NOLOCK, ...)` and `TABLESAMPLE (...)`.
    fn skip_table_hints(&mut self) {
        if self.base.check_keyword(Keyword::With)
            && self.base.peek(1).kind == TokenKind::Punctuation(Punctuation::LParen)
        {
            self.base.advance();
            self.base.skip_parenthesized();
        }
        if self.base.expect_word_ci("TABLESAMPLE").is_some() {
            self.base.skip_until(is_table_boundary);
        }
    }

    // ========================================================================
    // Names and lists
    // ========================================================================

    /// `part { . part }`; `db..table` skips the omitted schema.
    fn parse_multipart_name(&mut self) -> Option<MultiPartIdentifier> {
        let Some(first) = self.base.parse_identifier() else {
            self.error_expected("identifier");
            return None;
        };
        let mut name = MultiPartIdentifier::new(first);

        while self.base.check_punct(Punctuation::Period) {
            self.base.advance();
            if self.base.check_punct(Punctuation::Period) {
                continue;
            }
            match self.base.parse_identifier() {
                Some(part) => name.push(part),
                None => {
                    self.error_expected("identifier after `.`");
                    break;
                }
            }
        }
        Some(name)
    }

    /// `( ident, ... )`
    fn parse_identifier_list(&mut self) -> Vec<Identifier> {
        self.base.advance();
        let mut idents = Vec::new();
        loop {
            let ident = self.base.parse_identifier();
            if ident.is_none() {
                self.error_expected("identifier");
            }
            let parsed = ident.is_some();
            idents.extend(ident);
            if !self.finish_list_item(parsed, is_list_boundary) {
                break;
            }
        }
        self.close_paren();
        idents
    }

    fn parse_expression_list(&mut self) -> Vec<Expression> {
        let mut list = Vec::new();
        loop {
            let expr = self.parse_expression();
            let parsed = expr.is_some();
            list.extend(expr);
            if !self.finish_list_item(parsed, is_list_boundary) {
                return list;
            }
        }
    }

    /// `( [arg, ...] )` where an argument may be a bare `*`.
    fn parse_parenthesized_arguments(&mut self) -> Vec<Expression> {
        self.base.advance();
        if self.base.expect_punct(Punctuation::RParen).is_some() {
            return Vec::new();
        }
        let mut args = Vec::new();
        loop {
            let arg = if self.base.check_kind(TokenKind::Star) {
                let location = self.base.location();
                self.base.advance();
                Some(Expression::Column(ColumnReference {
                    identifier: None,
                    kind: ColumnKind::Wildcard,
                    location,
                }))
            } else {
                self.parse_expression()
            };
            let parsed = arg.is_some();
            args.extend(arg);
            if !self.finish_list_item(parsed, is_list_boundary) {
                break;
            }
        }
        self.close_paren();
        args
    }

    fn parse_order_by_list(&mut self) -> Vec<OrderByItem> {
        let mut items = Vec::new();
        loop {
            let item = self.parse_expression().map(|expr| {
                let ascending = if self.base.expect_keyword(Keyword::Asc).is_some() {
                    Some(true)
                } else if self.base.expect_keyword(Keyword::Desc).is_some() {
                    Some(false)
                } else {
                    None
                };
                OrderByItem { expr, ascending }
            });
            let parsed = item.is_some();
            items.extend(item);
            if !self.finish_list_item(parsed, is_order_by_boundary) {
                return items;
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> Option<Expression> {
        self.nested(is_list_boundary, Self::parse_or)
    }

    // Binary operator loops keep the left operand when the right one fails:
    // the error is already recorded and the names seen so far still count.

    fn parse_or(&mut self) -> Option<Expression> {
        let mut left = self.parse_and()?;
        while self.base.expect_keyword(Keyword::Or).is_some() {
            let Some(right) = self.parse_and() else {
                return Some(left);
            };
            left = binary(left, BinaryOperator::Or, right);
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expression> {
        let mut left = self.parse_not()?;
        while self.base.expect_keyword(Keyword::And).is_some() {
            let Some(right) = self.parse_not() else {
                return Some(left);
            };
            left = binary(left, BinaryOperator::And, right);
        }
        Some(left)
    }

    fn parse_not(&mut self) -> Option<Expression> {
        if self.base.expect_keyword(Keyword::Not).is_some() {
            let operand = self.nested(is_list_boundary, Self::parse_not)?;
            return Some(Expression::Unary {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> Option<Expression> {
        if self.base.check_keyword(Keyword::Exists) {
            self.base.advance();
            let query = self.parse_parenthesized_subquery()?;
            return Some(Expression::Exists(Box::new(query)));
        }

        let left = self.parse_additive()?;

        if let TokenKind::Operator(op) = self.base.current_kind() {
            if let Some(op) = comparison_operator(op) {
                self.base.advance();
                return Some(match self.parse_comparison_operand() {
                    Some(right) => binary(left, op, right),
                    None => left,
                });
            }
        }

        if self.base.expect_keyword(Keyword::Is).is_some() {
            let negated = self.base.expect_keyword(Keyword::Not).is_some();
            if self.expect_keyword_or_error(Keyword::Null, "NULL").is_none() {
                return Some(left);
            }
            return Some(Expression::IsNull {
                expr: Box::new(left),
                negated,
            });
        }

        let negated = self.base.check_keyword(Keyword::Not)
            && matches!(
                self.base.peek(1).kind,
                TokenKind::Keyword(Keyword::In | Keyword::Between | Keyword::Like)
            );
        if negated {
            self.base.advance();
        }

        match self.base.current_kind() {
            TokenKind::Keyword(Keyword::In) => {
                self.base.advance();
                self.parse_in(left, negated)
            }
            TokenKind::Keyword(Keyword::Between) => {
                self.base.advance();
                let Some(low) = self.parse_additive() else {
                    return Some(left);
                };
                if self.expect_keyword_or_error(Keyword::And, "AND").is_none() {
                    return Some(left);
                }
                let Some(high) = self.parse_additive() else {
                    return Some(left);
                };
                Some(Expression::Between {
                    expr: Box::new(left),
                    low: Box::new(low),
                    high: Box::new(high),
                    negated,
                })
            }
            TokenKind::Keyword(Keyword::Like) => {
                self.base.advance();
                let Some(pattern) = self.parse_additive() else {
                    return Some(left);
                };
                let escape = if self.base.expect_keyword(Keyword::Escape).is_some() {
                    self.parse_additive().map(Box::new)
                } else {
                    None
                };
                Some(Expression::Like {
                    expr: Box::new(left),
                    pattern: Box::new(pattern),
                    escape,
                    negated,
                })
            }
            _ => Some(left),
        }
    }

    /// Right side of a comparison, including `ALL|ANY|SOME (subquery)`.
    fn parse_comparison_operand(&mut self) -> Option<Expression> {
        let quantified = self.base.check_keyword(Keyword::All)
            || self.base.check_word_ci("ANY")
            || self.base.check_word_ci("SOME");
        if quantified && self.base.peek(1).kind == TokenKind::Punctuation(Punctuation::LParen) {
            self.base.advance();
            let query = self.parse_parenthesized_subquery()?;
            return Some(Expression::Subquery(Box::new(query)));
        }
        self.parse_additive()
    }

    fn parse_in(&mut self, left: Expression, negated: bool) -> Option<Expression> {
        if !self.base.check_punct(Punctuation::LParen) {
            self.error_expected("`(`");
            return Some(left);
        }
        if self.paren_then_query() {
            let Some(subquery) = self.parse_parenthesized_subquery() else {
                return Some(left);
            };
            return Some(Expression::InSubquery {
                expr: Box::new(left),
                subquery: Box::new(subquery),
                negated,
            });
        }
        self.base.advance();
        let list = self.parse_expression_list();
        self.close_paren();
        Some(Expression::InList {
            expr: Box::new(left),
            list,
            negated,
        })
    }

    /// `( query )`
    fn parse_parenthesized_subquery(&mut self) -> Option<SelectStatement> {
        if !self.paren_then_query() {
            self.error_expected("subquery");
            return None;
        }
        self.base.advance();
        let query = self.parse_query_statement();
        self.close_paren();
        query
    }

    fn parse_additive(&mut self) -> Option<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.base.current_kind() {
                TokenKind::Operator(Operator::Plus) => BinaryOperator::Plus,
                TokenKind::Operator(Operator::Minus) => BinaryOperator::Minus,
                TokenKind::Operator(Operator::Ampersand) => BinaryOperator::BitwiseAnd,
                TokenKind::Operator(Operator::Pipe) => BinaryOperator::BitwiseOr,
                TokenKind::Operator(Operator::Caret) => BinaryOperator::BitwiseXor,
                _ => return Some(left),
            };
            self.base.advance();
            let Some(right) = self.parse_multiplicative() else {
                return Some(left);
            };
            left = binary(left, op, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Option<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.base.current_kind() {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Operator(Operator::Slash) => BinaryOperator::Divide,
                TokenKind::Operator(Operator::Percent) => BinaryOperator::Modulo,
                _ => return Some(left),
            };
            self.base.advance();
            let Some(right) = self.parse_unary() else {
                return Some(left);
            };
            left = binary(left, op, right);
        }
    }

    fn parse_unary(&mut self) -> Option<Expression> {
        let op = match self.base.current_kind() {
            TokenKind::Operator(Operator::Minus) => UnaryOperator::Minus,
            TokenKind::Operator(Operator::Plus) => UnaryOperator::Plus,
            TokenKind::Operator(Operator::Tilde) => UnaryOperator::BitwiseNot,
            _ => return self.parse_primary(),
        };
        self.base.advance();
        let operand = self.nested(is_list_boundary, Self::parse_unary)?;
        Some(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Option<Expression> {
        let token = self.base.current_token();
        let next_is_paren = self.base.peek(1).kind == TokenKind::Punctuation(Punctuation::LParen);

        match token.kind {
            TokenKind::NumberLiteral => {
                let value = token.text.clone();
                self.base.advance();
                Some(Expression::Literal(Literal::Number(value)))
            }
            TokenKind::StringLiteral => {
                let value = string_literal_value(&token.text);
                self.base.advance();
                Some(Expression::Literal(Literal::String(value)))
            }
            TokenKind::Variable => {
                let name = token.text.clone();
                self.base.advance();
                Some(Expression::Variable(name))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.base.advance();
                Some(Expression::Literal(Literal::Null))
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case(),
            TokenKind::Keyword(Keyword::Convert) => self.parse_convert(),
            TokenKind::Keyword(Keyword::Exists) => {
                self.base.advance();
                let query = self.parse_parenthesized_subquery()?;
                Some(Expression::Exists(Box::new(query)))
            }
            // LEFT(name, 3) / RIGHT(name, 3)
            TokenKind::Keyword(Keyword::Left | Keyword::Right) if next_is_paren => {
                let name = MultiPartIdentifier::new(Identifier {
                    value: token.text.clone(),
                    quote_style: None,
                    location: token.location,
                });
                self.base.advance();
                self.parse_function_call(name)
            }
            TokenKind::Star => {
                self.error_expected("expression");
                None
            }
            TokenKind::Punctuation(Punctuation::LParen) => {
                if self.paren_then_query() {
                    let query = self.parse_parenthesized_subquery()?;
                    return Some(Expression::Subquery(Box::new(query)));
                }
                self.base.advance();
                let inner = self.parse_expression();
                self.close_paren();
                Some(Expression::Nested(Box::new(inner?)))
            }
            TokenKind::Identifier => {
                let is_plain = token.text.chars().all(|c| c.is_alphanumeric() || c == '_');
                if is_plain && next_is_paren {
                    if token.text.eq_ignore_ascii_case("CAST")
                        || token.text.eq_ignore_ascii_case("TRY_CAST")
                    {
                        return self.parse_cast();
                    }
                    if token.text.eq_ignore_ascii_case("TRY_CONVERT") {
                        return self.parse_convert();
                    }
                }
                let next_is_period =
                    self.base.peek(1).kind == TokenKind::Punctuation(Punctuation::Period);
                if is_plain
                    && !next_is_paren
                    && !next_is_period
                    && NILADIC_FUNCTIONS
                        .iter()
                        .any(|f| token.text.eq_ignore_ascii_case(f))
                {
                    let name = token.text.clone();
                    self.base.advance();
                    return Some(Expression::Niladic(name));
                }
                self.parse_column_or_function()
            }
            _ => {
                self.error_expected("expression");
                None
            }
        }
    }

    fn parse_column_or_function(&mut self) -> Option<Expression> {
        let location = self.base.location();
        let name = self.parse_multipart_name()?;
        if self.base.check_punct(Punctuation::LParen) {
            return self.parse_function_call(name);
        }
        Some(Expression::Column(ColumnReference {
            identifier: Some(name),
            kind: ColumnKind::Regular,
            location,
        }))
    }

    /// Arguments, optional `WITHIN GROUP (...)` and `OVER (...)`.
    fn parse_function_call(&mut self, name: MultiPartIdentifier) -> Option<Expression> {
        let distinct = self.base.peek(1).kind == TokenKind::Keyword(Keyword::Distinct);
        if distinct || self.base.peek(1).kind == TokenKind::Keyword(Keyword::All) {
            // Step onto the quantifier so argument parsing starts after it.
            self.base.advance();
        }
        let args = self.parse_parenthesized_arguments();

        if self.base.check_word_ci("WITHIN") {
            self.base.advance();
            self.base.expect_keyword(Keyword::Group);
            self.base.skip_parenthesized();
        }

        let over = if self.base.expect_keyword(Keyword::Over).is_some() {
            Some(self.parse_window_spec()?)
        } else {
            None
        };

        Some(Expression::Function {
            name,
            args,
            distinct,
            over,
        })
    }

    fn parse_window_spec(&mut self) -> Option<WindowSpec> {
        self.expect_punct_or_error(Punctuation::LParen, "`(`")?;
        let mut window = WindowSpec::default();

        if self.base.expect_word_ci("PARTITION").is_some()
            && self.expect_keyword_or_error(Keyword::By, "BY").is_some()
        {
            window.partition_by = self.parse_expression_list();
        }
        if self.base.expect_keyword(Keyword::Order).is_some()
            && self.expect_keyword_or_error(Keyword::By, "BY").is_some()
        {
            window.order_by = self.parse_order_by_list();
        }
        // ROWS/RANGE frame clauses reference no columns.
        if self.base.check_word_ci("ROWS") || self.base.check_word_ci("RANGE") {
            self.base.skip_until(is_group_end);
        }
        self.close_paren();
        Some(window)
    }

    fn parse_case(&mut self) -> Option<Expression> {
        self.base.advance();
        let operand = if self.base.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        let mut branches = Vec::new();
        while self.base.expect_keyword(Keyword::When).is_some() {
            let condition = self.parse_expression()?;
            self.expect_keyword_or_error(Keyword::Then, "THEN")?;
            let result = self.parse_expression()?;
            branches.push(WhenClause { condition, result });
        }
        if branches.is_empty() {
            self.error_expected("WHEN");
            return None;
        }

        let else_result = if self.base.expect_keyword(Keyword::Else).is_some() {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect_keyword_or_error(Keyword::End, "END")?;

        Some(Expression::Case {
            operand,
            branches,
            else_result,
        })
    }

    /// `CAST(expr AS type)` / `TRY_CAST(expr AS type)`
    fn parse_cast(&mut self) -> Option<Expression> {
        self.base.advance();
        self.base.advance();
        let expr = self.parse_expression()?;
        self.expect_keyword_or_error(Keyword::As, "AS")?;
        let data_type = self.parse_data_type()?;
        self.close_paren();
        Some(Expression::Cast {
            expr: Box::new(expr),
            data_type,
            style: None,
        })
    }

    /// `CONVERT(type, expr [, style])` / `TRY_CONVERT(...)`
    fn parse_convert(&mut self) -> Option<Expression> {
        self.base.advance();
        self.expect_punct_or_error(Punctuation::LParen, "`(`")?;
        let data_type = self.parse_data_type()?;
        self.expect_punct_or_error(Punctuation::Comma, "`,`")?;
        let expr = self.parse_expression()?;
        let style = if self.base.expect_punct(Punctuation::Comma).is_some() {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.close_paren();
        Some(Expression::Cast {
            expr: Box::new(expr),
            data_type,
            style,
        })
    }

    /// Type name with optional arguments, e.g. `decimal(18, 2)` or `varchar(max)`.
    fn parse_data_type(&mut self) -> Option<String> {
        let name = self.parse_multipart_name()?;
        let mut data_type = name
            .parts()
            .iter()
            .map(|p| p.value.as_str())
            .collect::<Vec<_>>()
            .join(".");

        if self.base.expect_punct(Punctuation::LParen).is_some() {
            let mut args = String::new();
            while !self.base.is_at_end() && !self.base.check_punct(Punctuation::RParen) {
                if self.base.check_punct(Punctuation::Comma) {
                    args.push_str(", ");
                } else {
                    args.push_str(&self.base.current_token().text);
                }
                self.base.advance();
            }
            self.close_paren();
            data_type = format!("{}({})", data_type, args);
        }
        Some(data_type)
    }
}

fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn comparison_operator(op: Operator) -> Option<BinaryOperator> {
    Some(match op {
        Operator::Eq => BinaryOperator::Eq,
        Operator::NotEq => BinaryOperator::NotEq,
        Operator::Lt => BinaryOperator::Lt,
        Operator::Gt => BinaryOperator::Gt,
        Operator::LtEq => BinaryOperator::LtEq,
        Operator::GtEq => BinaryOperator::GtEq,
        Operator::NotLt => BinaryOperator::NotLt,
        Operator::NotGt => BinaryOperator::NotGt,
        _ => return None,
    })
}
