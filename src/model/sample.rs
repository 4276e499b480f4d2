//! Station/elevation samples along a cross-section survey line.

use serde::{Deserialize, Serialize};

/// River bank marker on a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bank {
    Left,
    Right,
}

impl Bank {
    /// Parse a bank token (`L`, `LEFT`, `R`, `RIGHT`, any case).
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LEFT" => Some(Bank::Left),
            "R" | "RIGHT" => Some(Bank::Right),
            _ => None,
        }
    }

    /// Label written to output.
    pub fn label(&self) -> &'static str {
        match self {
            Bank::Left => "LEFT",
            Bank::Right => "RIGHT",
        }
    }
}

/// A sample as read from input, in source units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    /// Source line number (1-based).
    pub line: usize,
    /// Horizontal distance from the section origin.
    pub station: f64,
    /// Bed elevation at the station.
    pub elevation: f64,
    /// Manning's roughness coefficient, if known.
    pub roughness: Option<f64>,
    /// Bank marker, if the point is a bank.
    pub bank: Option<Bank>,
    /// Free-form point label (feature code, survey marker).
    pub marker: Option<String>,
}

impl RawSample {
    /// Create a raw sample with no attributes.
    pub fn new(line: usize, station: f64, elevation: f64) -> Self {
        Self {
            line,
            station,
            elevation,
            ..Default::default()
        }
    }
}

/// A sample expressed in a resolved unit system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub station: f64,
    pub elevation: f64,
    pub roughness: Option<f64>,
    pub bank: Option<Bank>,
    pub marker: Option<String>,
    /// Source line number, kept for diagnostics.
    #[serde(skip)]
    pub line: usize,
}

impl Sample {
    /// Create a sample with no attributes.
    pub fn new(station: f64, elevation: f64) -> Self {
        Self {
            station,
            elevation,
            ..Default::default()
        }
    }

    /// Check both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.station.is_finite() && self.elevation.is_finite()
    }
}

impl From<RawSample> for Sample {
    fn from(raw: RawSample) -> Self {
        Self {
            station: raw.station,
            elevation: raw.elevation,
            roughness: raw.roughness,
            bank: raw.bank,
            marker: raw.marker,
            line: raw.line,
        }
    }
}
