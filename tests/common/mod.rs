//! Common test utilities for query-disassembler tests

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use query_disassembler::SchemaCatalog;

const NS: &str = "http://schemas.microsoft.com/sqlserver/dac/Serialization/2012/02";

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Write a file below the context root, creating parent directories.
    pub fn write_file(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write a dacpac built from `builder` below the context root.
    pub fn write_dacpac(&self, relative: &str, builder: &DacpacBuilder) -> PathBuf {
        let path = self.root.join(relative);
        builder.write_to(&path);
        path
    }
}

/// Builds minimal `.dacpac` packages holding tables and views.
#[derive(Default)]
pub struct DacpacBuilder {
    /// (element type, schema, name, columns)
    objects: Vec<(&'static str, String, String, Vec<String>)>,
    omit_model: bool,
}

impl DacpacBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, schema: &str, name: &str, columns: &[&str]) -> Self {
        self.objects.push((
            "SqlTable",
            schema.to_string(),
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    pub fn view(mut self, schema: &str, name: &str, columns: &[&str]) -> Self {
        self.objects.push((
            "SqlView",
            schema.to_string(),
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    /// Leave `model.xml` out of the package.
    pub fn without_model(mut self) -> Self {
        self.omit_model = true;
        self
    }

    pub fn model_xml(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<DataSchemaModel FileFormatVersion=\"1.2\" SchemaVersion=\"2.9\" xmlns=\"{}\">\n  <Model>\n",
            NS
        );
        for (element_type, schema, name, columns) in &self.objects {
            let qualified = format!("[{}].[{}]", schema, name);
            let column_type = if *element_type == "SqlView" {
                "SqlComputedColumn"
            } else {
                "SqlSimpleColumn"
            };
            xml.push_str(&format!(
                "    <Element Type=\"{}\" Name=\"{}\">\n      <Relationship Name=\"Columns\">\n",
                element_type, qualified
            ));
            for column in columns {
                xml.push_str(&format!(
                    "        <Entry><Element Type=\"{}\" Name=\"{}.[{}]\" /></Entry>\n",
                    column_type, qualified, column
                ));
            }
            xml.push_str("      </Relationship>\n    </Element>\n");
        }
        xml.push_str("  </Model>\n</DataSchemaModel>\n");
        xml
    }

    pub fn write_to(&self, path: &Path) {
        let file = fs::File::create(path).expect("Failed to create dacpac");
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("DacMetadata.xml", options).unwrap();
        zip.write_all(b"<DacType xmlns=\"http://schemas.microsoft.com/sqlserver/dac/Serialization/2012/02\"><Name>test</Name></DacType>")
            .unwrap();
        if !self.omit_model {
            zip.start_file("model.xml", options).unwrap();
            zip.write_all(self.model_xml().as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
}

/// The Customers/Orders schema used throughout the tests.
pub fn sample_catalog() -> SchemaCatalog {
    SchemaCatalog::new()
        .with_table("dbo", "Customers", ["CustomerID", "Name", "Email"])
        .unwrap()
        .with_table("dbo", "Orders", ["OrderID", "CustomerID", "OrderDate", "Total"])
        .unwrap()
}

/// The same schema as [`sample_catalog`], packaged as a dacpac.
pub fn sample_dacpac() -> DacpacBuilder {
    DacpacBuilder::new()
        .table("dbo", "Customers", &["CustomerID", "Name", "Email"])
        .table("dbo", "Orders", &["OrderID", "CustomerID", "OrderDate", "Total"])
}
