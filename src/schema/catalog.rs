//! In-memory schema catalog

use tracing::trace;

use super::SchemaProvider;
use crate::error::{QueryDisassemblerError, Result};
use crate::util::eq_ci;

/// A table and its columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTable {
    pub schema: String,
    pub name: String,
    pub columns: Vec<String>,
}

/// Schema provider over a fixed list of tables.
///
/// Tables with the same name in different schemas all contribute their
/// columns, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: Vec<CatalogTable>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table. Fails if `name` is empty.
    pub fn add_table<I, S>(&mut self, schema: &str, name: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if name.trim().is_empty() {
            return Err(QueryDisassemblerError::InvalidArgument {
                name: "name",
                message: "table name must not be empty".to_string(),
            });
        }
        self.tables.push(CatalogTable {
            schema: schema.to_string(),
            name: name.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        Ok(())
    }

    /// Builder-style [`add_table`](Self::add_table).
    pub fn with_table<I, S>(mut self, schema: &str, name: &str, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_table(schema, name, columns)?;
        Ok(self)
    }

    pub fn tables(&self) -> &[CatalogTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<CatalogTable> for SchemaCatalog {
    fn from_iter<T: IntoIterator<Item = CatalogTable>>(iter: T) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

impl SchemaProvider for SchemaCatalog {
    fn get_columns(&self, table_name: &str) -> Result<Vec<String>> {
        let columns: Vec<String> = self
            .tables
            .iter()
            .filter(|t| eq_ci(&t.name, table_name))
            .flat_map(|t| t.columns.iter().cloned())
            .collect();
        trace!(table = table_name, columns = columns.len(), "catalog lookup");
        Ok(columns)
    }
}
