//! Syntax tree for T-SQL queries.
//!
//! The tree only models what is needed to locate table and column
//! references with full fidelity; clause bodies that carry no identifiers
//! (hints, `FOR XML`, `OPTION (...)`) are skipped by the parser.

mod visitor;

pub use visitor::{
    walk_column_reference, walk_cte, walk_expression, walk_named_table, walk_order_by,
    walk_script, walk_select, walk_select_item, walk_table_reference, Recursion, Visit, Visitor,
};

use crate::parser::Location;

/// A single (unquoted) identifier as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub value: String,
    /// `Some('[')` or `Some('"')` for delimited identifiers.
    pub quote_style: Option<char>,
    pub location: Location,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quote_style: None,
            location: Location::default(),
        }
    }
}

/// Dotted name chain such as `dbo.Orders.CustomerID`.
///
/// Always holds at least one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPartIdentifier {
    parts: Vec<Identifier>,
}

impl MultiPartIdentifier {
    pub fn new(first: Identifier) -> Self {
        Self { parts: vec![first] }
    }

    /// Build from parts in source order; `None` when `parts` is empty.
    pub fn from_parts(parts: Vec<Identifier>) -> Option<Self> {
        if parts.is_empty() {
            None
        } else {
            Some(Self { parts })
        }
    }

    pub fn push(&mut self, part: Identifier) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[Identifier] {
        &self.parts
    }

    /// The rightmost part: the object's own name without qualifiers.
    pub fn base_identifier(&self) -> &Identifier {
        &self.parts[self.parts.len() - 1]
    }

    pub fn location(&self) -> Location {
        self.parts[0].location
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Regular,
    /// `*` inside a function call, or `t.*`.
    Wildcard,
}

/// A reference to a column, optionally qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReference {
    /// Absent for a bare `*` (e.g. `COUNT(*)`).
    pub identifier: Option<MultiPartIdentifier>,
    pub kind: ColumnKind,
    pub location: Location,
}

/// Parse root: every query statement found in the text, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub statements: Vec<SelectStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpression {
    pub name: Identifier,
    pub columns: Vec<Identifier>,
    pub query: Box<SelectStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopClause {
    pub quantity: Expression,
    pub percent: bool,
    pub with_ties: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    Wildcard { location: Location },
    /// `t.*`; the reference carries the qualifier parts.
    QualifiedWildcard(ColumnReference),
    /// `expr [AS] alias` or `alias = expr`.
    Expression {
        expr: Expression,
        alias: Option<Identifier>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Except,
    Intersect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub operator: SetOperator,
    pub right: SelectStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    /// `Some(true)` for `ASC`, `Some(false)` for `DESC`.
    pub ascending: Option<bool>,
}

/// One `SELECT` query specification, plus any set operation chained after it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub ctes: Vec<CommonTableExpression>,
    pub distinct: bool,
    pub top: Option<TopClause>,
    pub projections: Vec<SelectItem>,
    /// `SELECT ... INTO target`; a creation target, not a table reference.
    pub into: Option<MultiPartIdentifier>,
    /// Empty when the query has no (parseable) `FROM` clause.
    pub from: Vec<TableReference>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderByItem>,
    pub set_operation: Option<Box<SetOperation>>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
    CrossApply,
    OuterApply,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTable {
    pub schema_object: MultiPartIdentifier,
    pub alias: Option<Identifier>,
}

impl NamedTable {
    /// Table name without schema/database qualifiers.
    pub fn base_name(&self) -> &str {
        &self.schema_object.base_identifier().value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    pub left: Box<TableReference>,
    pub right: Box<TableReference>,
    pub kind: JoinKind,
    /// `ON` condition; absent for `CROSS JOIN` and `APPLY`.
    pub condition: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub subquery: Box<SelectStatement>,
    pub alias: Option<Identifier>,
    pub column_aliases: Vec<Identifier>,
}

/// Table-valued function call such as `dbo.GetOrders(@id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFunction {
    pub name: MultiPartIdentifier,
    pub args: Vec<Expression>,
    pub alias: Option<Identifier>,
}

/// Table variable such as `@orders`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableTable {
    pub name: String,
    pub alias: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableReference {
    Named(NamedTable),
    Joined(JoinedTable),
    Derived(DerivedTable),
    Function(TableFunction),
    Variable(VariableTable),
    Parenthesized(Box<TableReference>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    String(String),
    Number(String),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    BitwiseNot,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    NotLt,
    NotGt,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    And,
    Or,
}

/// `OVER (PARTITION BY ... ORDER BY ...)`; frame clauses are skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expression,
    pub result: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(ColumnReference),
    Literal(Literal),
    Variable(String),
    /// Parameterless built-ins such as `CURRENT_TIMESTAMP`.
    Niladic(String),
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Function {
        name: MultiPartIdentifier,
        args: Vec<Expression>,
        distinct: bool,
        over: Option<WindowSpec>,
    },
    Case {
        operand: Option<Box<Expression>>,
        branches: Vec<WhenClause>,
        else_result: Option<Box<Expression>>,
    },
    /// `CAST`, `TRY_CAST`, `CONVERT` and `TRY_CONVERT`.
    Cast {
        expr: Box<Expression>,
        data_type: String,
        style: Option<Box<Expression>>,
    },
    Subquery(Box<SelectStatement>),
    Exists(Box<SelectStatement>),
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expression>,
        subquery: Box<SelectStatement>,
        negated: bool,
    },
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },
    Like {
        expr: Box<Expression>,
        pattern: Box<Expression>,
        escape: Option<Box<Expression>>,
        negated: bool,
    },
    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },
    Nested(Box<Expression>),
}
