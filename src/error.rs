//! Error types for cross-section conversion.

use crate::model::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Error classes, one per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input could not be opened or read (1)
    Io = 1,
    /// Malformed or unsupported input (2)
    Parse = 2,
    /// Units or datum could not be resolved (3)
    Normalization = 3,
    /// A structural invariant was violated (4)
    ValidationRejection = 4,
    /// Output destination failed (5)
    Serialization = 5,
}

/// Main error type for the converter.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Empty input: no survey rows found")]
    EmptyInput,

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Invalid numeric value for '{field}' at line {line}: '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Expected {expected} fields at line {line}, got {found}")]
    FieldCount {
        line: usize,
        expected: String,
        found: usize,
    },

    #[error("Missing required field '{field}' in section {section}")]
    MissingField { section: String, field: String },

    #[error("Unsupported input format '{name}'")]
    UnsupportedFormat { name: String },

    #[error("Unrecognized unit '{unit}' in section {section}")]
    UnknownUnit { section: String, unit: String },

    #[error("No unit declared for section {section} and no fallback unit configured")]
    MissingUnit { section: String },

    #[error("No datum declared for section {section} and no default datum configured")]
    MissingDatum { section: String },

    #[error("Datum '{datum}' in section {section} has no known offset to '{canonical}'")]
    UnknownDatum {
        section: String,
        datum: String,
        canonical: String,
    },

    #[error("Section {section} rejected: {}", summarize(.diagnostics))]
    Rejected {
        section: String,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("Failed to write output: {0}")]
    Serialization(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .filter(|d| d.is_rejection())
        .map(|d| d.message())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConvertError {
    /// Get the error class for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::FileNotFound { .. } => ErrorKind::Io,
            ConvertError::EmptyInput => ErrorKind::Parse,
            ConvertError::ParseError { .. } => ErrorKind::Parse,
            ConvertError::InvalidNumber { .. } => ErrorKind::Parse,
            ConvertError::FieldCount { .. } => ErrorKind::Parse,
            ConvertError::MissingField { .. } => ErrorKind::Parse,
            ConvertError::UnsupportedFormat { .. } => ErrorKind::Parse,
            ConvertError::UnknownUnit { .. } => ErrorKind::Normalization,
            ConvertError::MissingUnit { .. } => ErrorKind::Normalization,
            ConvertError::MissingDatum { .. } => ErrorKind::Normalization,
            ConvertError::UnknownDatum { .. } => ErrorKind::Normalization,
            ConvertError::Rejected { .. } => ErrorKind::ValidationRejection,
            ConvertError::Serialization(_) => ErrorKind::Serialization,
            ConvertError::Io(_) => ErrorKind::Io,
        }
    }

    /// Get the numeric code, suitable as a process exit status.
    pub fn code(&self) -> i32 {
        self.kind() as i32
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ConvertError::ParseError {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
