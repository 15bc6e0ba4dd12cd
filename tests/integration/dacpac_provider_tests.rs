//! Integration tests for resolving wildcard queries from a .dacpac

use pretty_assertions::assert_eq;

use query_disassembler::{
    DacpacSchemaProvider, ExtractionOptions, QueryDisassemblerError, QueryParser,
    SchemaProvider, WildcardDetection,
};

use crate::common::{sample_catalog, sample_dacpac, DacpacBuilder, TestContext};

#[test]
fn test_dacpac_matches_in_memory_catalog() {
    let ctx = TestContext::new();
    let path = ctx.write_dacpac("db.dacpac", &sample_dacpac());
    let dacpac = DacpacSchemaProvider::new(&path).unwrap();
    let catalog = sample_catalog();

    for table in ["Customers", "orders", "ORDERS", "Missing"] {
        assert_eq!(
            dacpac.get_columns(table).unwrap(),
            catalog.get_columns(table).unwrap(),
            "{}",
            table
        );
    }
}

#[test]
fn test_resolve_star_query_from_dacpac() {
    let ctx = TestContext::new();
    let path = ctx.write_dacpac("db.dacpac", &sample_dacpac());
    let parser = QueryParser::new(DacpacSchemaProvider::new(&path).unwrap());

    let fields = parser
        .get_field_names_from_query(
            "SELECT * FROM dbo.Customers c JOIN Orders o ON o.CustomerID = c.CustomerID",
        )
        .unwrap();
    assert_eq!(
        fields,
        vec![
            "CustomerID",
            "Name",
            "Email",
            "OrderID",
            "CustomerID",
            "OrderDate",
            "Total"
        ]
    );
}

#[test]
fn test_views_resolve_like_tables() {
    let ctx = TestContext::new();
    let builder = DacpacBuilder::new()
        .table("dbo", "Orders", &["OrderID", "Total"])
        .view("reporting", "OrderTotals", &["CustomerID", "Total Spent"]);
    let path = ctx.write_dacpac("db.dacpac", &builder);
    let parser = QueryParser::new(DacpacSchemaProvider::new(&path).unwrap());

    assert_eq!(
        parser
            .get_field_names_from_query("SELECT * FROM reporting.OrderTotals")
            .unwrap(),
        vec!["CustomerID", "Total Spent"]
    );
}

#[test]
fn test_same_table_name_in_two_schemas() {
    let ctx = TestContext::new();
    let builder = DacpacBuilder::new()
        .table("dbo", "Orders", &["OrderID"])
        .table("archive", "Orders", &["OrderID", "ArchivedAt"]);
    let path = ctx.write_dacpac("db.dacpac", &builder);
    let provider = DacpacSchemaProvider::new(&path).unwrap();

    assert_eq!(
        provider.get_columns("Orders").unwrap(),
        vec!["OrderID", "OrderID", "ArchivedAt"]
    );
}

#[test]
fn test_structural_mode_skips_lookup_for_count_star() {
    let ctx = TestContext::new();
    // No package on disk: any lookup would fail.
    let missing = ctx.root.join("missing.dacpac");
    let parser = QueryParser::with_options(
        DacpacSchemaProvider::new(&missing).unwrap(),
        ExtractionOptions {
            wildcard_detection: WildcardDetection::Structural,
        },
    );

    assert_eq!(
        parser
            .get_field_names_from_query("SELECT COUNT(*), Name FROM Customers")
            .unwrap(),
        vec!["Name"]
    );
}

#[test]
fn test_missing_dacpac_is_an_error_not_empty() {
    let ctx = TestContext::new();
    let missing = ctx.root.join("missing.dacpac");
    let parser = QueryParser::new(DacpacSchemaProvider::new(&missing).unwrap());

    let err = parser
        .get_field_names_from_query("SELECT * FROM Customers")
        .unwrap_err();
    assert!(matches!(err, QueryDisassemblerError::DacpacReadError { .. }));
}

#[test]
fn test_dacpac_without_model_is_an_error() {
    let ctx = TestContext::new();
    let path = ctx.write_dacpac("empty.dacpac", &DacpacBuilder::new().without_model());
    let provider = DacpacSchemaProvider::new(&path).unwrap();

    let err = provider.get_columns("Customers").unwrap_err();
    assert!(matches!(err, QueryDisassemblerError::ModelXmlMissing { .. }));
    assert!(err.to_string().contains("model.xml"));
}

#[test]
fn test_corrupt_dacpac_is_an_error() {
    let ctx = TestContext::new();
    let path = ctx.write_file("corrupt.dacpac", b"PK\x03\x04 truncated");
    let provider = DacpacSchemaProvider::new(&path).unwrap();

    assert!(provider.get_columns("Customers").is_err());
}

#[test]
fn test_empty_path_rejected_at_construction() {
    assert!(matches!(
        DacpacSchemaProvider::new(""),
        Err(QueryDisassemblerError::InvalidArgument { .. })
    ));
}
