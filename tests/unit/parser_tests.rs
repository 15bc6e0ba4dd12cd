//! Unit tests for the T-SQL query parser
//!
//! These go through the public `parse` entry point and inspect the tree.

use query_disassembler::ast::{
    Expression, JoinKind, SelectItem, SelectStatement, SetOperator, TableReference,
};
use query_disassembler::parser::{parse, ParseErrorKind};

fn parse_one(sql: &str) -> SelectStatement {
    let result = parse(sql);
    assert!(
        result.errors.is_empty(),
        "Unexpected errors for {}: {:?}",
        sql,
        result.errors
    );
    assert_eq!(result.script.statements.len(), 1, "Expected 1 statement");
    result.script.statements.into_iter().next().unwrap()
}

fn table_name(table: &TableReference) -> String {
    match table {
        TableReference::Named(named) => named.base_name().to_string(),
        other => panic!("Expected named table, got {:?}", other),
    }
}

// ============================================================================
// Batch Separator Tests
// ============================================================================

#[test]
fn test_go_separates_batches() {
    let sql = r#"
SELECT a FROM T1
GO
SELECT b FROM T2
go
SELECT c FROM T3
"#;
    let result = parse(sql);
    assert!(result.errors.is_empty());
    assert_eq!(result.script.statements.len(), 3, "Expected 3 statements from 3 batches");
}

#[test]
fn test_go_line_inside_string_does_not_split() {
    let select = parse_one("SELECT 'a\nGO\nb' AS text FROM T");
    assert_eq!(select.projections.len(), 1);
    assert_eq!(table_name(&select.from[0]), "T");
}

#[test]
fn test_go_line_inside_block_comment_does_not_split() {
    let select = parse_one("SELECT a /* note\nGO\n*/ FROM T");
    assert_eq!(table_name(&select.from[0]), "T");
}

// ============================================================================
// Select list
// ============================================================================

#[test]
fn test_projection_forms() {
    let select = parse_one("SELECT *, t.*, a, b AS x, c y, z = d, 'lit' FROM T t");
    assert!(matches!(select.projections[0], SelectItem::Wildcard { .. }));
    assert!(matches!(select.projections[1], SelectItem::QualifiedWildcard(_)));
    assert_eq!(select.projections.len(), 7);
}

#[test]
fn test_top_and_distinct() {
    let select = parse_one("SELECT DISTINCT TOP 5 a FROM T");
    assert!(select.distinct);
    assert!(select.top.is_some());
}

#[test]
fn test_variable_assignment_projection() {
    let select = parse_one("SELECT @total = SUM(Total) FROM Orders");
    let SelectItem::Expression { expr, alias } = &select.projections[0] else {
        panic!("Expected expression item");
    };
    assert!(alias.is_none());
    assert!(matches!(expr, Expression::Function { .. }));
}

// ============================================================================
// FROM clause
// ============================================================================

#[test]
fn test_join_kinds() {
    let cases = [
        ("JOIN", JoinKind::Inner),
        ("INNER JOIN", JoinKind::Inner),
        ("LEFT JOIN", JoinKind::LeftOuter),
        ("LEFT OUTER JOIN", JoinKind::LeftOuter),
        ("RIGHT JOIN", JoinKind::RightOuter),
        ("FULL OUTER JOIN", JoinKind::FullOuter),
    ];
    for (join, expected) in cases {
        let sql = format!("SELECT * FROM A {} B ON A.id = B.id", join);
        let select = parse_one(&sql);
        let TableReference::Joined(joined) = &select.from[0] else {
            panic!("Expected join for {}", join);
        };
        assert_eq!(joined.kind, expected, "{}", join);
        assert_eq!(table_name(&joined.left), "A");
        assert_eq!(table_name(&joined.right), "B");
    }
}

#[test]
fn test_comma_separated_sources() {
    let select = parse_one("SELECT * FROM A, B b, dbo.C AS c");
    let names: Vec<_> = select.from.iter().map(table_name).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn test_four_part_name() {
    let select = parse_one("SELECT * FROM [server].[db].[dbo].[Orders]");
    let TableReference::Named(named) = &select.from[0] else {
        panic!("Expected named table");
    };
    assert_eq!(named.schema_object.parts().len(), 4);
    assert_eq!(named.base_name(), "Orders");
}

#[test]
fn test_table_function_source() {
    let select = parse_one("SELECT * FROM dbo.GetOrders(@id, 5) AS o");
    let TableReference::Function(function) = &select.from[0] else {
        panic!("Expected table function");
    };
    assert_eq!(function.args.len(), 2);
    assert_eq!(function.alias.as_ref().unwrap().value, "o");
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_union_chain() {
    let select = parse_one("SELECT a FROM A UNION SELECT b FROM B INTERSECT SELECT c FROM C");
    let union = select.set_operation.as_ref().unwrap();
    assert_eq!(union.operator, SetOperator::Union);
    assert_eq!(
        union.right.set_operation.as_ref().unwrap().operator,
        SetOperator::Intersect
    );
}

#[test]
fn test_parenthesized_query() {
    let select = parse_one("(SELECT a FROM T)");
    assert_eq!(table_name(&select.from[0]), "T");
}

#[test]
fn test_multiple_ctes() {
    let select = parse_one(
        "WITH a AS (SELECT x FROM T), b AS (SELECT y FROM a) SELECT * FROM b",
    );
    assert_eq!(select.ctes.len(), 2);
    assert_eq!(select.ctes[1].name.value, "b");
}

#[test]
fn test_terminated_statements() {
    let result = parse(";;SELECT a FROM T;;SELECT b FROM U;");
    assert!(result.errors.is_empty());
    assert_eq!(result.script.statements.len(), 2);
}

// ============================================================================
// Error recovery
// ============================================================================

#[test]
fn test_missing_projection_still_returns_statement() {
    let result = parse("SELECT FROM");
    assert!(!result.errors.is_empty());
    let select = result.first_statement().expect("statement expected");
    assert!(select.projections.is_empty());
    assert!(select.from.is_empty());
}

#[test]
fn test_missing_on_condition() {
    let result = parse("SELECT * FROM A JOIN B WHERE x = 1");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("ON"));
    let select = result.first_statement().unwrap();
    assert!(select.where_clause.is_some());
}

#[test]
fn test_garbage_in_where_recovers_at_next_clause() {
    let result = parse("SELECT a FROM T WHERE b = = 1 ORDER BY a");
    assert!(!result.errors.is_empty());
    let select = result.first_statement().unwrap();
    assert_eq!(select.order_by.len(), 1);
}

#[test]
fn test_non_select_statements_reported() {
    let result = parse("DELETE FROM T; CREATE TABLE X (id INT); SELECT a FROM U");
    assert_eq!(result.errors.len(), 2);
    assert!(result
        .errors
        .iter()
        .all(|e| e.kind == ParseErrorKind::Syntax && e.message.contains("unsupported")));
    assert_eq!(result.script.statements.len(), 1);
}

#[test]
fn test_error_display_includes_location() {
    let result = parse("SELECT a\nFROM");
    let message = result.errors[0].to_string();
    assert!(message.contains("line 2"), "{}", message);
}
