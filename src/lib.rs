//! query-disassembler: table and field names from T-SQL queries
//!
//! This library parses T-SQL `SELECT` queries into a syntax tree and walks
//! it with visitors to list the tables and columns a query references.
//! Queries selecting `*` can be expanded to real column names through a
//! [`SchemaProvider`], such as a `.dacpac` package.
//!
//! ```
//! use query_disassembler::{extract_field_names, extract_table_names};
//!
//! let sql = "SELECT o.OrderID, c.Name FROM Orders o JOIN Customers c ON o.CustomerID = c.ID";
//! assert_eq!(extract_table_names(sql), vec!["Orders", "Customers"]);
//! assert_eq!(
//!     extract_field_names(sql),
//!     vec!["o", "OrderID", "c", "Name", "o", "CustomerID", "c", "ID"]
//! );
//! ```

pub mod ast;
pub mod error;
pub mod extract;
pub mod parser;
pub mod schema;
pub mod source;
mod util;

pub use error::{QueryDisassemblerError, Result};
pub use extract::{
    extract_field_names, extract_table_names, get_field_names_from_query, ColumnNameCollector,
    ExtractionOptions, QueryParser, TableNameCollector, WildcardDetection, WildcardDetector,
};
pub use parser::{parse, ParseError, ParseErrorKind, ParseResult};
pub use schema::{DacpacSchemaProvider, SchemaCatalog, SchemaProvider};
