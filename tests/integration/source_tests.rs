//! Integration tests for analyzing query files on disk

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use query_disassembler::source::{analyze_files, discover_query_files, read_query_file};
use query_disassembler::QueryDisassemblerError;

use crate::common::TestContext;

#[test]
fn test_analyze_directory() {
    let ctx = TestContext::new();
    ctx.write_file(
        "reports/customers.sql",
        "SELECT c.Name, c.Email FROM dbo.Customers c\nGO\nSELECT COUNT(*) FROM Orders\n",
    );
    ctx.write_file("reports/broken.sql", "SELECT FROM Orders");
    ctx.write_file("bin/Debug/generated.sql", "SELECT * FROM Generated");

    let files = discover_query_files(&ctx.root);
    assert_eq!(files.len(), 2);

    let reports = analyze_files(&files).unwrap();
    let broken = &reports[0];
    assert!(broken.path.ends_with("broken.sql"));
    assert!(!broken.is_clean());
    assert_eq!(broken.table_names, vec!["Orders"]);

    let customers = &reports[1];
    assert!(customers.is_clean());
    assert_eq!(customers.table_names, vec!["Customers", "Orders"]);
    assert_eq!(customers.field_names, vec!["c", "Name", "c", "Email"]);
}

#[test]
fn test_windows_1252_file() {
    let ctx = TestContext::new();
    let path = ctx.write_file("legacy.sql", b"SELECT [Stra\xDFe] FROM Adressen");

    assert_eq!(read_query_file(&path).unwrap(), "SELECT [Straße] FROM Adressen");
    let reports = analyze_files(&[path]).unwrap();
    assert_eq!(reports[0].field_names, vec!["Straße"]);
}

#[test]
fn test_unreadable_file_aborts() {
    let ctx = TestContext::new();
    let good = ctx.write_file("good.sql", "SELECT a FROM T");
    let missing: PathBuf = ctx.root.join("missing.sql");

    let err = analyze_files(&[good, missing]).unwrap_err();
    assert!(matches!(err, QueryDisassemblerError::SqlFileReadError { .. }));
}

#[test]
fn test_many_files_in_parallel() {
    let ctx = TestContext::new();
    for i in 0..20 {
        ctx.write_file(
            &format!("q/{:02}.sql", i),
            format!("SELECT col{} FROM table{}", i, i),
        );
    }

    let files = discover_query_files(&ctx.root);
    let reports = analyze_files(&files).unwrap();
    assert_eq!(reports.len(), 20);
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.table_names, vec![format!("table{}", i)]);
    }
}
