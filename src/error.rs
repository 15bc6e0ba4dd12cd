//! Error types for query-disassembler

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving query metadata.
///
/// Parse problems are not represented here: they are accumulated as
/// [`ParseError`](crate::parser::ParseError)s next to the (partial) tree.
#[derive(Error, Debug)]
pub enum QueryDisassemblerError {
    #[error("Invalid argument `{name}`: {message}")]
    InvalidArgument { name: &'static str, message: String },

    #[error("Schema lookup failed for table {table}: {message}")]
    SchemaLookupFailed { table: String, message: String },

    #[error("Failed to read dacpac: {path}")]
    DacpacReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP read error: {message}")]
    ZipError { message: String },

    #[error("Dacpac {path} does not contain model.xml")]
    ModelXmlMissing { path: PathBuf },

    #[error("Failed to parse model.xml in {path}")]
    ModelXmlParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<zip::result::ZipError> for QueryDisassemblerError {
    fn from(err: zip::result::ZipError) -> Self {
        QueryDisassemblerError::ZipError {
            message: err.to_string(),
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, QueryDisassemblerError>;
