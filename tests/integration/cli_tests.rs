//! Integration tests for the query-disassembler binary

use std::process::{Command, Output};

use crate::common::{sample_dacpac, TestContext};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_query-disassembler"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run query-disassembler")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn test_tables_command() {
    let output = run(&[
        "tables",
        "--query",
        "SELECT * FROM dbo.Orders o JOIN Customers c ON o.CustomerID = c.CustomerID",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["Orders", "Customers"]);
}

#[test]
fn test_fields_command_from_file() {
    let ctx = TestContext::new();
    let path = ctx.write_file("q.sql", "SELECT o.OrderID, Total FROM Orders o");
    let output = run(&["fields", "--file", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["o", "OrderID", "Total"]);
}

#[test]
fn test_resolve_command() {
    let ctx = TestContext::new();
    let dacpac = ctx.write_dacpac("db.dacpac", &sample_dacpac());
    let output = run(&[
        "resolve",
        "--query",
        "SELECT * FROM Customers",
        "--dacpac",
        dacpac.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout_lines(&output), vec!["CustomerID", "Name", "Email"]);
}

#[test]
fn test_resolve_missing_dacpac_fails() {
    let ctx = TestContext::new();
    let missing = ctx.root.join("missing.dacpac");
    let output = run(&[
        "resolve",
        "--query",
        "SELECT * FROM Customers",
        "--dacpac",
        missing.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to resolve columns"));
}

#[test]
fn test_query_and_file_are_exclusive() {
    let output = run(&["tables", "--query", "SELECT 1", "--file", "q.sql"]);
    assert!(!output.status.success());
    let output = run(&["tables"]);
    assert!(!output.status.success());
}

#[test]
fn test_check_command_reports_errors() {
    let ctx = TestContext::new();
    ctx.write_file("good.sql", "SELECT a FROM T");
    ctx.write_file("bad.sql", "SELECT FROM T");

    let output = run(&["check", "--path", ctx.root.to_str().unwrap()]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 files, 1 with errors"), "{}", stdout);
    assert!(stdout.contains("syntax error"), "{}", stdout);
}

#[test]
fn test_check_command_clean() {
    let ctx = TestContext::new();
    ctx.write_file("good.sql", "SELECT a FROM T");

    let output = run(&["check", "--path", ctx.root.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 files, 0 with errors"));
}
