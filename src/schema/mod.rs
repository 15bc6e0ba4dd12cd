//! Column metadata lookup used to expand wildcard queries.

mod catalog;
mod dacpac;

pub use catalog::{CatalogTable, SchemaCatalog};
pub use dacpac::{DacpacContents, DacpacSchemaProvider};

use std::rc::Rc;
use std::sync::Arc;

use crate::error::Result;

/// Source of column names for tables.
///
/// Table names are matched case-insensitively on the table's own name
/// (no schema qualifier). An unknown table yields an empty list; a lookup
/// that could not be carried out is an error.
pub trait SchemaProvider {
    /// Column names of `table_name` in ordinal order.
    fn get_columns(&self, table_name: &str) -> Result<Vec<String>>;

    /// Columns of several tables, concatenated in the order given.
    ///
    /// Providers backed by an external resource override this to acquire
    /// the resource once for the whole batch.
    fn get_columns_for_tables(&self, table_names: &[String]) -> Result<Vec<String>> {
        let mut columns = Vec::new();
        for table_name in table_names {
            columns.extend(self.get_columns(table_name)?);
        }
        Ok(columns)
    }
}

macro_rules! forward_schema_provider {
    ($($pointer:ty),* $(,)?) => {
        $(
            impl<T: SchemaProvider + ?Sized> SchemaProvider for $pointer {
                fn get_columns(&self, table_name: &str) -> Result<Vec<String>> {
                    (**self).get_columns(table_name)
                }

                fn get_columns_for_tables(&self, table_names: &[String]) -> Result<Vec<String>> {
                    (**self).get_columns_for_tables(table_names)
                }
            }
        )*
    };
}

forward_schema_provider!(&T, Box<T>, Rc<T>, Arc<T>);
