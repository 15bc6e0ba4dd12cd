//! Centralized identifier handling utilities for T-SQL parsing.
//!
//! SQL Server identifiers come in three forms: regular (`Orders`),
//! bracket-delimited (`[Order Details]`) and double-quoted (`"Order Details"`).
//! Delimited identifiers escape their closing delimiter by doubling it
//! (`[a]]b]` is the identifier `a]b`).
//!
//! # Examples
//!
//! ```ignore
//! use crate::parser::identifier_utils::*;
//!
//! assert_eq!(normalize_identifier("[MyTable]"), "MyTable");
//! assert_eq!(normalize_identifier("\"My\"\"Col\""), "My\"Col");
//! assert_eq!(split_qualified_name("[dbo].[Orders].[Id]"), vec!["dbo", "Orders", "Id"]);
//! ```

/// Returns the delimiter character if the identifier is delimited.
pub fn quote_style(ident: &str) -> Option<char> {
    if is_bracketed(ident) {
        Some('[')
    } else if is_double_quoted(ident) {
        Some('"')
    } else {
        None
    }
}

/// Check if an identifier is wrapped in brackets.
pub fn is_bracketed(ident: &str) -> bool {
    ident.len() >= 2 && ident.starts_with('[') && ident.ends_with(']')
}

/// Check if an identifier is wrapped in double quotes.
pub fn is_double_quoted(ident: &str) -> bool {
    ident.len() >= 2 && ident.starts_with('"') && ident.ends_with('"')
}

/// Strips brackets `[]` or double quotes `""` from an identifier and
/// unescapes doubled closing delimiters.
///
/// Regular identifiers are returned unchanged (minus surrounding whitespace).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_identifier("[MyTable]"), "MyTable");
/// assert_eq!(normalize_identifier("[a]]b]"), "a]b");
/// assert_eq!(normalize_identifier("dbo"), "dbo");
/// ```
pub fn normalize_identifier(ident: &str) -> String {
    let trimmed = ident.trim();
    match quote_style(trimmed) {
        Some('[') => trimmed[1..trimmed.len() - 1].replace("]]", "]"),
        Some(_) => trimmed[1..trimmed.len() - 1].replace("\"\"", "\""),
        None => trimmed.to_string(),
    }
}

/// Splits a dotted multi-part name into its unquoted parts.
///
/// Dots inside delimited parts do not split. Used for the fully qualified
/// names found in dacpac models such as `[dbo].[Orders].[Id]`.
pub fn split_qualified_name(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = name.chars().peekable();
    let mut closing: Option<char> = None;

    while let Some(c) = chars.next() {
        match closing {
            Some(close) => {
                if c == close {
                    if chars.peek() == Some(&close) {
                        current.push(close);
                        chars.next();
                    } else {
                        closing = None;
                    }
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '[' => closing = Some(']'),
                '"' => closing = Some('"'),
                '.' => parts.push(std::mem::take(&mut current)),
                c if c.is_whitespace() => {}
                c => current.push(c),
            },
        }
    }
    parts.push(current);
    parts
}
