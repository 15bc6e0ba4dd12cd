//! Table and field name extraction
//!
//! The free functions parse SQL text and run a single collector over the
//! tree. [`QueryParser`] adds wildcard resolution: a query selecting `*` has
//! its columns looked up through a [`SchemaProvider`] instead.

mod collectors;

pub use collectors::{ColumnNameCollector, TableNameCollector, WildcardDetector};

use tracing::{debug, warn};

use crate::error::Result;
use crate::parser::{parse, ParseResult};
use crate::schema::SchemaProvider;

/// Every column reference part in the query, in source order.
///
/// Parse errors are logged and otherwise ignored; whatever could be parsed
/// contributes names.
pub fn extract_field_names(sql: &str) -> Vec<String> {
    let result = parse_logged(sql);
    ColumnNameCollector::collect(&result.script)
}

/// The base name of every table referenced in the query, in source order.
pub fn extract_table_names(sql: &str) -> Vec<String> {
    let result = parse_logged(sql);
    TableNameCollector::collect(&result.script)
}

/// Field names for `sql`, resolving wildcards through `provider` with
/// default [`ExtractionOptions`].
pub fn get_field_names_from_query<P: SchemaProvider>(sql: &str, provider: P) -> Result<Vec<String>> {
    QueryParser::new(provider).get_field_names_from_query(sql)
}

fn parse_logged(sql: &str) -> ParseResult {
    let result = parse(sql);
    if result.has_errors() {
        warn!(
            errors = result.errors.len(),
            first = %result.errors[0],
            "query parsed with errors"
        );
    }
    result
}

/// How a query is judged to select a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WildcardDetection {
    /// The raw text contains `*` anywhere, including in literals, comments
    /// and `COUNT(*)`.
    #[default]
    Textual,
    /// A projection list in the parsed query is `*` or `t.*`.
    Structural,
}

/// Options for [`QueryParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractionOptions {
    pub wildcard_detection: WildcardDetection,
}

/// Extracts field names, expanding wildcard queries through a schema provider.
#[derive(Debug, Clone)]
pub struct QueryParser<P> {
    provider: P,
    options: ExtractionOptions,
}

impl<P: SchemaProvider> QueryParser<P> {
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, ExtractionOptions::default())
    }

    pub fn with_options(provider: P, options: ExtractionOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn options(&self) -> ExtractionOptions {
        self.options
    }

    /// Field names referenced by `sql`.
    ///
    /// If the query selects a wildcard, the columns of every referenced
    /// table are returned instead, concatenated in table order. Provider
    /// errors are returned unchanged.
    pub fn get_field_names_from_query(&self, sql: &str) -> Result<Vec<String>> {
        let result = parse_logged(sql);

        if !self.selects_wildcard(sql, &result) {
            return Ok(ColumnNameCollector::collect(&result.script));
        }

        let tables = TableNameCollector::collect(&result.script);
        debug!(
            detection = ?self.options.wildcard_detection,
            tables = ?tables,
            "resolving wildcard query through schema provider"
        );
        self.get_field_names_from_metadata(&tables)
    }

    /// Columns of each table, concatenated in the order given.
    pub fn get_field_names_from_metadata(&self, table_names: &[String]) -> Result<Vec<String>> {
        self.provider.get_columns_for_tables(table_names)
    }

    fn selects_wildcard(&self, sql: &str, result: &ParseResult) -> bool {
        match self.options.wildcard_detection {
            WildcardDetection::Textual => sql.contains('*'),
            WildcardDetection::Structural => WildcardDetector::detect(&result.script),
        }
    }
}
