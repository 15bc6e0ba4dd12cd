//! Schema provider backed by a `.dacpac` package
//!
//! A dacpac is a ZIP archive whose `model.xml` describes every object in the
//! database. Tables (`SqlTable`) and views (`SqlView`) list their columns in a
//! `Columns` relationship:
//!
//! ```xml
//! <Element Type="SqlTable" Name="[dbo].[Orders]">
//!   <Relationship Name="Columns">
//!     <Entry>
//!       <Element Type="SqlSimpleColumn" Name="[dbo].[Orders].[OrderID]" />
//!     </Entry>
//!   </Relationship>
//! </Element>
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{CatalogTable, SchemaCatalog, SchemaProvider};
use crate::error::{QueryDisassemblerError, Result};
use crate::parser::split_qualified_name;

const NS: &str = "http://schemas.microsoft.com/sqlserver/dac/Serialization/2012/02";

const MODEL_XML: &str = "model.xml";

/// Element types whose columns can be selected from.
const COLUMN_OWNER_TYPES: &[&str] = &["SqlTable", "SqlView"];

/// Check if a node is an element with the given local name in the DAC namespace.
fn is_ns_element(node: &roxmltree::Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace() == Some(NS)
}

/// Find the first child element with the given local name in the DAC namespace.
fn find_child<'a>(
    parent: &roxmltree::Node<'a, 'a>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    parent.children().find(|c| is_ns_element(c, local_name))
}

/// The `model.xml` entry of a dacpac, read into memory.
#[derive(Debug, Clone)]
pub struct DacpacContents {
    path: PathBuf,
    model_xml: String,
}

impl DacpacContents {
    /// Open the archive at `path` and read its `model.xml`.
    ///
    /// The file handle is released before this returns.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| QueryDisassemblerError::DacpacReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = ZipArchive::new(file).map_err(|e| QueryDisassemblerError::ZipError {
            message: format!("Failed to read dacpac {}: {}", path.display(), e),
        })?;

        let mut entry = match archive.by_name(MODEL_XML) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(QueryDisassemblerError::ModelXmlMissing {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(QueryDisassemblerError::ZipError {
                    message: format!("Failed to read {} in {}: {}", MODEL_XML, path.display(), e),
                })
            }
        };

        let mut model_xml = String::new();
        entry
            .read_to_string(&mut model_xml)
            .map_err(|e| QueryDisassemblerError::DacpacReadError {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            model_xml,
        })
    }

    pub fn model_xml(&self) -> &str {
        &self.model_xml
    }

    /// Tables and views declared in the model, in document order.
    pub fn tables(&self) -> Result<Vec<CatalogTable>> {
        let xml = self.model_xml.strip_prefix('\u{FEFF}').unwrap_or(&self.model_xml);
        let doc = roxmltree::Document::parse(xml).map_err(|e| {
            QueryDisassemblerError::ModelXmlParseError {
                path: self.path.clone(),
                source: e,
            }
        })?;

        let root = doc.root_element();
        let Some(model) = find_child(&root, "Model") else {
            return Ok(Vec::new());
        };

        let tables = model
            .children()
            .filter(|c| is_ns_element(c, "Element"))
            .filter(|c| {
                c.attribute("Type")
                    .is_some_and(|t| COLUMN_OWNER_TYPES.contains(&t))
            })
            .filter_map(|element| table_from_element(&element))
            .collect();
        Ok(tables)
    }
}

fn table_from_element(element: &roxmltree::Node) -> Option<CatalogTable> {
    let mut parts = split_qualified_name(element.attribute("Name")?);
    let name = parts.pop().filter(|n| !n.is_empty())?;
    let schema = parts.join(".");

    let columns = element
        .children()
        .find(|c| is_ns_element(c, "Relationship") && c.attribute("Name") == Some("Columns"))
        .map(|rel| {
            rel.children()
                .filter(|c| is_ns_element(c, "Entry"))
                .filter_map(|entry| {
                    // Inline column definitions, or references to columns declared elsewhere.
                    let column = find_child(&entry, "Element")
                        .or_else(|| find_child(&entry, "References"))?;
                    split_qualified_name(column.attribute("Name")?).pop()
                })
                .collect()
        })
        .unwrap_or_default();

    Some(CatalogTable {
        schema,
        name,
        columns,
    })
}

/// Resolves columns from the tables and views of a `.dacpac` package.
///
/// The package is opened for every lookup and closed again before the
/// lookup returns; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct DacpacSchemaProvider {
    path: PathBuf,
}

impl DacpacSchemaProvider {
    /// Create a provider for the package at `path`. Fails if `path` is empty.
    ///
    /// The file itself is not touched until the first lookup.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(QueryDisassemblerError::InvalidArgument {
                name: "path",
                message: "dacpac path must not be empty".to_string(),
            });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the package into an in-memory catalog.
    pub fn load_catalog(&self) -> Result<SchemaCatalog> {
        let contents = DacpacContents::from_path(&self.path)?;
        let catalog: SchemaCatalog = contents.tables()?.into_iter().collect();
        debug!(
            path = %self.path.display(),
            tables = catalog.len(),
            "loaded dacpac model"
        );
        Ok(catalog)
    }
}

impl SchemaProvider for DacpacSchemaProvider {
    fn get_columns(&self, table_name: &str) -> Result<Vec<String>> {
        self.load_catalog()?.get_columns(table_name)
    }

    fn get_columns_for_tables(&self, table_names: &[String]) -> Result<Vec<String>> {
        self.load_catalog()?.get_columns_for_tables(table_names)
    }
}
