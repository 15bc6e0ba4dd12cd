//! Differential tests against sqlparser's relation visitor
//!
//! For plain queries over named tables, the table names found by
//! `extract_table_names` must match the relations sqlparser reports, in
//! the same order.

use std::ops::ControlFlow;

use pretty_assertions::assert_eq;
use sqlparser::ast::visit_relations;
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;

use query_disassembler::extract_table_names;

fn sqlparser_relations(sql: &str) -> Vec<String> {
    let statements = Parser::parse_sql(&MsSqlDialect {}, sql)
        .unwrap_or_else(|e| panic!("sqlparser rejected {}: {}", sql, e));
    let mut visited = Vec::new();

    visit_relations(&statements, |relation| {
        if let Some(ident) = relation.0.last() {
            visited.push(ident.value.clone());
        }
        ControlFlow::<()>::Continue(())
    });
    visited
}

const QUERIES: &[&str] = &[
    "SELECT a, b FROM T",
    "SELECT * FROM dbo.Orders",
    "SELECT * FROM [Sales].[Order Details] AS d",
    "SELECT o.OrderID, c.Name FROM Orders o JOIN Customers c ON o.CustomerID = c.CustomerID",
    "SELECT * FROM A LEFT JOIN B ON A.id = B.id RIGHT JOIN C ON B.id = C.id",
    "SELECT * FROM A, B, C WHERE A.x = B.x AND B.y = C.y",
    "SELECT * FROM A CROSS JOIN B",
    "SELECT x FROM (SELECT x FROM Inner1) AS d",
    "SELECT a FROM T WHERE a IN (SELECT a FROM U) AND EXISTS (SELECT 1 FROM V WHERE V.a = T.a)",
    "SELECT (SELECT MAX(Total) FROM Orders) AS m, Name FROM Customers",
    "SELECT a FROM T UNION ALL SELECT a FROM U",
    "SELECT TOP 10 a FROM T ORDER BY a DESC",
    "SELECT a, COUNT(*) FROM T GROUP BY a HAVING COUNT(*) > (SELECT 1 FROM Thresholds)",
    "WITH recent AS (SELECT id FROM Orders) SELECT id FROM recent",
    "SELECT * FROM A JOIN B ON A.id = B.id AND B.code IN (SELECT code FROM Codes)",
];

#[test]
fn test_table_names_match_sqlparser() {
    for sql in QUERIES {
        assert_eq!(
            extract_table_names(sql),
            sqlparser_relations(sql),
            "Mismatch for {}",
            sql
        );
    }
}
