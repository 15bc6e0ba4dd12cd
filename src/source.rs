//! Reading queries from `.sql` files

use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{QueryDisassemblerError, Result};
use crate::extract::{ColumnNameCollector, TableNameCollector};
use crate::parser::{parse, ParseError};

/// Minimum number of files to benefit from parallel processing.
/// Below this threshold, sequential processing is faster due to rayon overhead.
const PARALLEL_THRESHOLD: usize = 8;

/// What was found in one query file.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    pub path: PathBuf,
    pub table_names: Vec<String>,
    pub field_names: Vec<String>,
    pub errors: Vec<ParseError>,
}

impl QueryReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback.
///
/// A leading byte order mark is stripped.
pub fn read_query_file(path: &Path) -> Result<String> {
    let read_error = |source| QueryDisassemblerError::SqlFileReadError {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(path).map_err(read_error)?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            // SQL files saved on Windows are commonly Windows-1252.
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                return Err(read_error(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                )));
            }
            debug!(path = %path.display(), "decoded file as Windows-1252");
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// All `.sql` files below `root`, sorted, skipping `bin` and `obj` output
/// directories. A file path is returned as is.
pub fn discover_query_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.depth() > 0
                && matches!(entry.file_name().to_str(), Some("bin" | "obj")))
        })
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
        })
        .collect();
    files.sort();
    files
}

/// Analyze a single query file.
pub fn analyze_file(path: &Path) -> Result<QueryReport> {
    let content = read_query_file(path)?;
    let result = parse(&content);

    Ok(QueryReport {
        path: path.to_path_buf(),
        table_names: TableNameCollector::collect(&result.script),
        field_names: ColumnNameCollector::collect(&result.script),
        errors: result.errors,
    })
}

/// Analyze multiple query files, using parallel processing for larger file sets.
///
/// Reports are returned in input order. The first unreadable file aborts
/// the whole run.
pub fn analyze_files(files: &[PathBuf]) -> Result<Vec<QueryReport>> {
    let reports: Vec<QueryReport> = if files.len() >= PARALLEL_THRESHOLD {
        files
            .par_iter()
            .map(|file| analyze_file(file))
            .collect::<Result<_>>()?
    } else {
        files
            .iter()
            .map(|file| analyze_file(file))
            .collect::<Result<_>>()?
    };

    info!(
        files = reports.len(),
        with_errors = reports.iter().filter(|r| !r.is_clean()).count(),
        "analyzed query files"
    );
    Ok(reports)
}
