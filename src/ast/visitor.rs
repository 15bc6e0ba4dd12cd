//! Generic traversal over the syntax tree.
//!
//! A [`Visitor`] overrides only the hooks it cares about. Every hook defaults
//! to [`Recursion::Continue`], so traversal reaches all descendants even for
//! node kinds a visitor knows nothing about. Traversal is pre-order,
//! depth-first and left-to-right in source order.
//!
//! The `walk_*` functions implement the recursion for each node kind; they
//! call the node's hook first and descend only if it returned `Continue`.

use super::{
    ColumnReference, CommonTableExpression, Expression, NamedTable, OrderByItem, Script,
    SelectItem, SelectStatement, TableReference,
};

/// Whether a traversal should descend into the children of the visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recursion {
    Continue,
    SkipChildren,
}

pub trait Visitor {
    fn visit_script(&mut self, _script: &Script) -> Recursion {
        Recursion::Continue
    }

    fn visit_select(&mut self, _select: &SelectStatement) -> Recursion {
        Recursion::Continue
    }

    fn visit_cte(&mut self, _cte: &CommonTableExpression) -> Recursion {
        Recursion::Continue
    }

    fn visit_select_item(&mut self, _item: &SelectItem) -> Recursion {
        Recursion::Continue
    }

    fn visit_table_reference(&mut self, _table: &TableReference) -> Recursion {
        Recursion::Continue
    }

    fn visit_named_table(&mut self, _table: &NamedTable) -> Recursion {
        Recursion::Continue
    }

    fn visit_expression(&mut self, _expr: &Expression) -> Recursion {
        Recursion::Continue
    }

    fn visit_column_reference(&mut self, _column: &ColumnReference) -> Recursion {
        Recursion::Continue
    }

    fn visit_order_by(&mut self, _item: &OrderByItem) -> Recursion {
        Recursion::Continue
    }
}

/// A node that can be traversed by a [`Visitor`].
pub trait Visit {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V);
}

macro_rules! impl_visit {
    ($($node:ty => $walk:ident),* $(,)?) => {
        $(
            impl Visit for $node {
                fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
                    $walk(visitor, self);
                }
            }
        )*
    };
}

impl_visit!(
    Script => walk_script,
    SelectStatement => walk_select,
    CommonTableExpression => walk_cte,
    SelectItem => walk_select_item,
    TableReference => walk_table_reference,
    NamedTable => walk_named_table,
    Expression => walk_expression,
    ColumnReference => walk_column_reference,
    OrderByItem => walk_order_by,
);

pub fn walk_script<V: Visitor + ?Sized>(visitor: &mut V, script: &Script) {
    if visitor.visit_script(script) == Recursion::SkipChildren {
        return;
    }
    for statement in &script.statements {
        walk_select(visitor, statement);
    }
}

pub fn walk_select<V: Visitor + ?Sized>(visitor: &mut V, select: &SelectStatement) {
    if visitor.visit_select(select) == Recursion::SkipChildren {
        return;
    }
    for cte in &select.ctes {
        walk_cte(visitor, cte);
    }
    if let Some(top) = &select.top {
        walk_expression(visitor, &top.quantity);
    }
    for item in &select.projections {
        walk_select_item(visitor, item);
    }
    for table in &select.from {
        walk_table_reference(visitor, table);
    }
    if let Some(condition) = &select.where_clause {
        walk_expression(visitor, condition);
    }
    for expr in &select.group_by {
        walk_expression(visitor, expr);
    }
    if let Some(condition) = &select.having {
        walk_expression(visitor, condition);
    }
    for item in &select.order_by {
        walk_order_by(visitor, item);
    }
    if let Some(set_operation) = &select.set_operation {
        walk_select(visitor, &set_operation.right);
    }
}

pub fn walk_cte<V: Visitor + ?Sized>(visitor: &mut V, cte: &CommonTableExpression) {
    if visitor.visit_cte(cte) == Recursion::SkipChildren {
        return;
    }
    walk_select(visitor, &cte.query);
}

pub fn walk_select_item<V: Visitor + ?Sized>(visitor: &mut V, item: &SelectItem) {
    if visitor.visit_select_item(item) == Recursion::SkipChildren {
        return;
    }
    match item {
        SelectItem::Wildcard { .. } => {}
        SelectItem::QualifiedWildcard(column) => walk_column_reference(visitor, column),
        SelectItem::Expression { expr, .. } => walk_expression(visitor, expr),
    }
}

pub fn walk_table_reference<V: Visitor + ?Sized>(visitor: &mut V, table: &TableReference) {
    if visitor.visit_table_reference(table) == Recursion::SkipChildren {
        return;
    }
    match table {
        TableReference::Named(named) => walk_named_table(visitor, named),
        TableReference::Joined(joined) => {
            walk_table_reference(visitor, &joined.left);
            walk_table_reference(visitor, &joined.right);
            if let Some(condition) = &joined.condition {
                walk_expression(visitor, condition);
            }
        }
        TableReference::Derived(derived) => walk_select(visitor, &derived.subquery),
        TableReference::Function(function) => {
            for arg in &function.args {
                walk_expression(visitor, arg);
            }
        }
        TableReference::Variable(_) => {}
        TableReference::Parenthesized(inner) => walk_table_reference(visitor, inner),
    }
}

pub fn walk_named_table<V: Visitor + ?Sized>(visitor: &mut V, table: &NamedTable) {
    // Leaf: identifiers are not nodes of their own.
    visitor.visit_named_table(table);
}

pub fn walk_column_reference<V: Visitor + ?Sized>(visitor: &mut V, column: &ColumnReference) {
    visitor.visit_column_reference(column);
}

pub fn walk_order_by<V: Visitor + ?Sized>(visitor: &mut V, item: &OrderByItem) {
    if visitor.visit_order_by(item) == Recursion::SkipChildren {
        return;
    }
    walk_expression(visitor, &item.expr);
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expression) {
    if visitor.visit_expression(expr) == Recursion::SkipChildren {
        return;
    }
    match expr {
        Expression::Column(column) => walk_column_reference(visitor, column),
        Expression::Literal(_) | Expression::Variable(_) | Expression::Niladic(_) => {}
        Expression::Unary { operand, .. } => walk_expression(visitor, operand),
        Expression::Binary { left, right, .. } => {
            walk_expression(visitor, left);
            walk_expression(visitor, right);
        }
        Expression::Function { args, over, .. } => {
            for arg in args {
                walk_expression(visitor, arg);
            }
            if let Some(window) = over {
                for expr in &window.partition_by {
                    walk_expression(visitor, expr);
                }
                for item in &window.order_by {
                    walk_order_by(visitor, item);
                }
            }
        }
        Expression::Case {
            operand,
            branches,
            else_result,
        } => {
            if let Some(operand) = operand {
                walk_expression(visitor, operand);
            }
            for branch in branches {
                walk_expression(visitor, &branch.condition);
                walk_expression(visitor, &branch.result);
            }
            if let Some(else_result) = else_result {
                walk_expression(visitor, else_result);
            }
        }
        Expression::Cast { expr, style, .. } => {
            walk_expression(visitor, expr);
            if let Some(style) = style {
                walk_expression(visitor, style);
            }
        }
        Expression::Subquery(query) | Expression::Exists(query) => walk_select(visitor, query),
        Expression::InList { expr, list, .. } => {
            walk_expression(visitor, expr);
            for item in list {
                walk_expression(visitor, item);
            }
        }
        Expression::InSubquery { expr, subquery, .. } => {
            walk_expression(visitor, expr);
            walk_select(visitor, subquery);
        }
        Expression::Between {
            expr, low, high, ..
        } => {
            walk_expression(visitor, expr);
            walk_expression(visitor, low);
            walk_expression(visitor, high);
        }
        Expression::Like {
            expr,
            pattern,
            escape,
            ..
        } => {
            walk_expression(visitor, expr);
            walk_expression(visitor, pattern);
            if let Some(escape) = escape {
                walk_expression(visitor, escape);
            }
        }
        Expression::IsNull { expr, .. } | Expression::Nested(expr) => {
            walk_expression(visitor, expr)
        }
    }
}
