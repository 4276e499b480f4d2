//! xsec-convert-rs - River cross-section survey conversion.
//!
//! Reads raw cross-section surveys (delimited station/elevation text or DAT
//! survey records), normalizes them to one canonical unit and vertical datum,
//! checks the geometry and writes a canonical output artifact.
//!
//! The canonical text output is itself a valid delimited input, so a converted
//! file can be converted again with the same result. JSON output is for
//! downstream tools only and is not accepted as input.
//!
//! # Example
//!
//! ```no_run
//! use xsec_convert_rs::{convert_file, ConversionOptions, InputFormat};
//! use std::path::Path;
//!
//! let options = ConversionOptions::default();
//! let result = convert_file(
//!     Path::new("XS_12.csv"),
//!     Path::new("XS_12.out"),
//!     InputFormat::Delimited,
//!     &options,
//! );
//! for diagnostic in &result.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! std::process::exit(result.exit_code());
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod transform;
pub mod validation;

// Re-exports for convenience
pub use config::{
    CanonicalSystem, ConversionOptions, ElevationRange, LengthUnit, ManningOverrides, OutputFormat,
    Strictness,
};
pub use error::{ConvertError, ErrorKind, Result};
pub use model::{Diagnostic, DiagnosticKind, Section, Severity, ValidatedSection};
pub use parser::{parse_sections, InputFormat};
pub use pipeline::{check_file, convert, convert_file, ConversionResult, Outcome, Pipeline};
pub use transform::normalize;
pub use validation::{validate_section, ValidationPolicy};
