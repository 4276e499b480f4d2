//! Survey input parsers.
//!
//! Parsing is purely syntactic: rows come back in input order, with
//! duplicates kept and values in source units.

mod dat;
mod delimited;
pub mod feature_codes;
mod fields;

pub use dat::{parse_dat, parse_dat_with};
pub use delimited::{parse_delimited, DelimitedParser};

use crate::config::ManningOverrides;
use crate::error::{ConvertError, Result};
use crate::model::RawSection;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Supported raw input encodings. Always chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Station/elevation columns with a key=value header.
    Delimited,
    /// NEWSEC/XSS survey records.
    Dat,
}

impl InputFormat {
    /// Map a file extension to a format when the mapping is unambiguous.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "csv" | "tsv" | "txt" | "xs" => Some(InputFormat::Delimited),
            "dat" => Some(InputFormat::Dat),
            _ => None,
        }
    }

    /// Format name as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::Delimited => "delimited",
            InputFormat::Dat => "dat",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for InputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "delimited" | "csv" | "text" => Ok(InputFormat::Delimited),
            "dat" => Ok(InputFormat::Dat),
            _ => Err(ConvertError::UnsupportedFormat {
                name: s.to_string(),
            }),
        }
    }
}

/// Parse survey content in the given format.
pub fn parse_str(content: &str, format: InputFormat) -> Result<Vec<RawSection>> {
    parse_str_with(content, format, &ManningOverrides::default())
}

/// Parse survey content, resolving DAT roughness with the given overrides.
pub fn parse_str_with(
    content: &str,
    format: InputFormat,
    mannings: &ManningOverrides,
) -> Result<Vec<RawSection>> {
    if content.trim().is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    match format {
        InputFormat::Delimited => parse_delimited(content),
        InputFormat::Dat => parse_dat_with(content, mannings),
    }
}

/// Read a whole input stream and parse it.
pub fn parse_sections<R: Read>(reader: R, format: InputFormat) -> Result<Vec<RawSection>> {
    parse_sections_with(reader, format, &ManningOverrides::default())
}

/// Read a whole input stream and parse it with Manning's n overrides.
pub fn parse_sections_with<R: Read>(
    mut reader: R,
    format: InputFormat,
    mannings: &ManningOverrides,
) -> Result<Vec<RawSection>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let content = String::from_utf8(bytes)
        .map_err(|e| ConvertError::parse(0, format!("input is not valid UTF-8: {}", e)))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    parse_str_with(content, format, mannings)
}
