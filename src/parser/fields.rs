//! Line and field helpers shared by the input formats.

use crate::error::{ConvertError, Result};

/// Check if a line carries no data (blank or comment).
pub fn is_ignorable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#') || line.starts_with(';')
}

/// Parse a `[Name]` block header.
pub fn parse_block_header(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
        Some(trimmed[1..trimmed.len() - 1].trim())
    } else {
        None
    }
}

/// Parse a key=value pair from a line.
///
/// The key must start with a letter and contain only letters, digits,
/// `_` or spaces, so data rows never parse as header entries.
pub fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();
    let valid_key = key.starts_with(|c: char| c.is_ascii_alphabetic())
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ');
    if valid_key {
        Some((key, value))
    } else {
        None
    }
}

/// Normalize a header key for matching: lowercase, no `_` or spaces.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a data row into trimmed fields.
///
/// The delimiter is chosen per row: comma, then semicolon, then tab,
/// then runs of whitespace.
pub fn split_fields(line: &str) -> Vec<&str> {
    let line = line.trim();
    for delimiter in [',', ';', '\t'] {
        if line.contains(delimiter) {
            return line.split(delimiter).map(str::trim).collect();
        }
    }
    line.split_whitespace().collect()
}

/// Parse a required numeric field.
pub fn parse_number(value: &str, line: usize, field: &'static str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| ConvertError::InvalidNumber {
            line,
            field,
            value: value.trim().to_string(),
        })
}

/// Parse an optional numeric field; empty means absent.
pub fn parse_optional_number(value: &str, line: usize, field: &'static str) -> Result<Option<f64>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_number(value, line, field).map(Some)
    }
}

/// Turn an empty field into `None`.
pub fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
