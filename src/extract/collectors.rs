//! Visitors that collect names from a parsed query.

use crate::ast::{ColumnReference, NamedTable, Recursion, SelectItem, Visit, Visitor};

/// Collects the base name of every table referenced by name.
///
/// Names are kept in source order and not deduplicated. Schema and
/// database qualifiers are dropped; derived tables, table-valued functions
/// and table variables contribute nothing themselves.
#[derive(Debug, Default)]
pub struct TableNameCollector {
    names: Vec<String>,
}

impl TableNameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a fresh collector over `node`.
    pub fn collect<N: Visit + ?Sized>(node: &N) -> Vec<String> {
        let mut collector = Self::new();
        node.accept(&mut collector);
        collector.names
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

impl Visitor for TableNameCollector {
    fn visit_named_table(&mut self, table: &NamedTable) -> Recursion {
        self.names.push(table.base_name().to_string());
        Recursion::Continue
    }
}

/// Collects every part of every column reference.
///
/// `o.CustomerID` contributes `o` and `CustomerID`; `t.*` contributes `t`;
/// `COUNT(*)` contributes nothing.
#[derive(Debug, Default)]
pub struct ColumnNameCollector {
    names: Vec<String>,
}

impl ColumnNameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a fresh collector over `node`.
    pub fn collect<N: Visit + ?Sized>(node: &N) -> Vec<String> {
        let mut collector = Self::new();
        node.accept(&mut collector);
        collector.names
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

impl Visitor for ColumnNameCollector {
    fn visit_column_reference(&mut self, column: &ColumnReference) -> Recursion {
        if let Some(identifier) = &column.identifier {
            self.names
                .extend(identifier.parts().iter().map(|part| part.value.clone()));
        }
        Recursion::Continue
    }
}

/// Detects `*` or `t.*` in any projection list, including nested queries.
#[derive(Debug, Default)]
pub struct WildcardDetector {
    found: bool,
}

impl WildcardDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `node` projects a wildcard anywhere.
    pub fn detect<N: Visit + ?Sized>(node: &N) -> bool {
        let mut detector = Self::new();
        node.accept(&mut detector);
        detector.found
    }

    pub fn found(&self) -> bool {
        self.found
    }
}

impl Visitor for WildcardDetector {
    fn visit_select_item(&mut self, item: &SelectItem) -> Recursion {
        if matches!(
            item,
            SelectItem::Wildcard { .. } | SelectItem::QualifiedWildcard(_)
        ) {
            self.found = true;
            return Recursion::SkipChildren;
        }
        Recursion::Continue
    }
}
