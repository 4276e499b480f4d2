//! Diagnostics recorded while validating a section.

use serde::Serialize;
use std::fmt;

/// How a detected anomaly affects the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Noted, output unaffected.
    Informational,
    /// Repaired; output differs from input.
    Corrected,
    /// Section cannot be converted.
    Rejected,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Informational => write!(f, "info"),
            Severity::Corrected => write!(f, "corrected"),
            Severity::Rejected => write!(f, "rejected"),
        }
    }
}

/// The anomaly itself, with the samples involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A later sample repeats an earlier station and was dropped.
    DuplicateStation {
        station: f64,
        kept_line: usize,
        dropped_line: usize,
    },
    /// Stations stop increasing between two consecutive samples.
    NonMonotonic {
        previous_station: f64,
        station: f64,
        previous_line: usize,
        line: usize,
    },
    /// Elevation outside the plausible window.
    ElevationOutOfRange {
        station: f64,
        elevation: f64,
        min: f64,
        max: f64,
        line: usize,
    },
    /// Station or elevation is NaN or infinite.
    NonFinite { line: usize },
    /// Too few samples survive to form a profile.
    TooFewSamples { count: usize },
}

impl DiagnosticKind {
    /// Source lines of the samples involved.
    pub fn lines(&self) -> Vec<usize> {
        match self {
            DiagnosticKind::DuplicateStation {
                kept_line,
                dropped_line,
                ..
            } => vec![*kept_line, *dropped_line],
            DiagnosticKind::NonMonotonic {
                previous_line,
                line,
                ..
            } => vec![*previous_line, *line],
            DiagnosticKind::ElevationOutOfRange { line, .. } => vec![*line],
            DiagnosticKind::NonFinite { line } => vec![*line],
            DiagnosticKind::TooFewSamples { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::DuplicateStation {
                station,
                kept_line,
                dropped_line,
            } => write!(
                f,
                "duplicate station {} at line {} dropped (kept line {})",
                station, dropped_line, kept_line
            ),
            DiagnosticKind::NonMonotonic {
                previous_station,
                station,
                previous_line,
                line,
            } => write!(
                f,
                "stations not increasing: {} (line {}) followed by {} (line {})",
                previous_station, previous_line, station, line
            ),
            DiagnosticKind::ElevationOutOfRange {
                station,
                elevation,
                min,
                max,
                line,
            } => write!(
                f,
                "elevation {} at station {} (line {}) outside plausible range [{}, {}]",
                elevation, station, line, min, max
            ),
            DiagnosticKind::NonFinite { line } => {
                write!(f, "non-finite station or elevation at line {}", line)
            }
            DiagnosticKind::TooFewSamples { count } => write!(
                f,
                "{} sample{} left, at least 2 required",
                count,
                if *count == 1 { "" } else { "s" }
            ),
        }
    }
}

/// A detected anomaly, its severity and the section it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub section: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(section: impl Into<String>, severity: Severity, kind: DiagnosticKind) -> Self {
        Self {
            section: section.into(),
            severity,
            kind,
        }
    }

    /// Check if this diagnostic blocks conversion.
    pub fn is_rejection(&self) -> bool {
        self.severity == Severity::Rejected
    }

    /// Human-readable description without the severity tag.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.section, self.kind)
    }
}
