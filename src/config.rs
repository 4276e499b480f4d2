//! Configuration constants and settings for the converter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Floating-point comparison epsilon, in canonical units.
pub const EPS: f64 = 1e-6;

/// Default number of decimals written for stations and elevations.
pub const DEFAULT_PRECISION: usize = 3;

/// Highest precision accepted for output.
pub const MAX_PRECISION: usize = 9;

/// Default canonical datum name.
pub const DEFAULT_DATUM: &str = "NAVD88";

/// Lowest plausible riverbed elevation, in meters.
pub const MIN_PLAUSIBLE_ELEVATION_M: f64 = -500.0;

/// Highest plausible riverbed elevation, in meters.
pub const MAX_PLAUSIBLE_ELEVATION_M: f64 = 9000.0;

/// Meters per international foot.
pub const M_PER_FOOT: f64 = 0.3048;

/// Meters per US survey foot.
pub const M_PER_US_SURVEY_FOOT: f64 = 1200.0 / 3937.0;

/// Meters per inch.
pub const M_PER_INCH: f64 = 0.0254;

/// Unit of length for stations and elevations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "usft")]
    UsSurveyFeet,
    #[serde(rename = "in")]
    Inches,
}

impl LengthUnit {
    /// Parse a unit label as found in survey headers.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Some(LengthUnit::Meters),
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Some(LengthUnit::Centimeters)
            }
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Some(LengthUnit::Millimeters)
            }
            "ft" | "foot" | "feet" | "intft" => Some(LengthUnit::Feet),
            "usft" | "us-ft" | "us_ft" | "survey-ft" | "us survey feet" => {
                Some(LengthUnit::UsSurveyFeet)
            }
            "in" | "inch" | "inches" => Some(LengthUnit::Inches),
            _ => None,
        }
    }

    /// Get the conversion factor from this unit to meters.
    pub fn to_meters_factor(&self) -> f64 {
        match self {
            LengthUnit::Meters => 1.0,
            LengthUnit::Centimeters => 0.01,
            LengthUnit::Millimeters => 0.001,
            LengthUnit::Feet => M_PER_FOOT,
            LengthUnit::UsSurveyFeet => M_PER_US_SURVEY_FOOT,
            LengthUnit::Inches => M_PER_INCH,
        }
    }

    /// Factor that converts a value in this unit into `target`.
    pub fn factor_to(&self, target: LengthUnit) -> f64 {
        if *self == target {
            1.0
        } else {
            self.to_meters_factor() / target.to_meters_factor()
        }
    }

    /// Short label used in output headers.
    pub fn label(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Millimeters => "mm",
            LengthUnit::Feet => "ft",
            LengthUnit::UsSurveyFeet => "usft",
            LengthUnit::Inches => "in",
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LengthUnit::from_label(s).ok_or_else(|| format!("unrecognized unit '{}'", s))
    }
}

/// Target unit and datum every section is converted into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalSystem {
    /// Length unit for stations and elevations.
    pub unit: LengthUnit,
    /// Vertical datum elevations are referenced to.
    pub datum: String,
}

impl Default for CanonicalSystem {
    fn default() -> Self {
        Self {
            unit: LengthUnit::Meters,
            datum: DEFAULT_DATUM.to_string(),
        }
    }
}

impl CanonicalSystem {
    /// Create a canonical system.
    pub fn new(unit: LengthUnit, datum: impl Into<String>) -> Self {
        Self {
            unit,
            datum: datum.into(),
        }
    }

    /// Check whether a datum name refers to the canonical datum.
    pub fn is_canonical_datum(&self, datum: &str) -> bool {
        datum.trim().eq_ignore_ascii_case(self.datum.trim())
    }
}

/// How out-of-range elevations are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Out-of-range elevations are informational.
    #[default]
    Lenient,
    /// Out-of-range elevations reject the section.
    Strict,
}

/// Plausible elevation window, in canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationRange {
    pub min: f64,
    pub max: f64,
}

impl ElevationRange {
    /// Create a range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The default plausible range expressed in `unit`.
    pub fn default_for(unit: LengthUnit) -> Self {
        let factor = LengthUnit::Meters.factor_to(unit);
        Self {
            min: MIN_PLAUSIBLE_ELEVATION_M * factor,
            max: MAX_PLAUSIBLE_ELEVATION_M * factor,
        }
    }

    /// Check if an elevation lies inside the window.
    pub fn contains(&self, elevation: f64) -> bool {
        float_cmp::in_range(elevation, self.min, self.max)
    }
}

impl Default for ElevationRange {
    fn default() -> Self {
        Self::default_for(LengthUnit::Meters)
    }
}

/// Output encoding of the converted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Delimited text with `[Section]` header blocks.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

/// Manning's n overrides keyed by feature code, replacing the built-in table values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManningOverrides {
    /// Surface codes (`SOIL`, `CONC`, ...) to roughness.
    pub surface: BTreeMap<String, f64>,
    /// Vegetation codes (`LG`, `TR`, ...) to roughness.
    pub vegetation: BTreeMap<String, f64>,
}

impl ManningOverrides {
    /// Overridden roughness for a surface code.
    pub fn surface(&self, code: &str) -> Option<f64> {
        lookup(&self.surface, code)
    }

    /// Overridden roughness for a vegetation code.
    pub fn vegetation(&self, code: &str) -> Option<f64> {
        lookup(&self.vegetation, code)
    }

    /// Check whether no override is configured.
    pub fn is_empty(&self) -> bool {
        self.surface.is_empty() && self.vegetation.is_empty()
    }
}

fn lookup(table: &BTreeMap<String, f64>, code: &str) -> Option<f64> {
    table
        .iter()
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(code.trim()))
        .map(|(_, n)| *n)
}

/// Options for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Target unit and datum.
    pub canonical: CanonicalSystem,
    /// Unit assumed when the input declares none.
    pub source_unit: Option<LengthUnit>,
    /// Datum assumed when the input declares none.
    pub default_datum: Option<String>,
    /// Known datum offsets to the canonical datum, in canonical units.
    pub datum_offsets: BTreeMap<String, f64>,
    /// Treatment of out-of-range elevations.
    pub strictness: Strictness,
    /// Plausible elevation window; defaults to the canonical unit's window.
    pub elevation_range: Option<ElevationRange>,
    /// Decimal places for stations and elevations.
    pub precision: usize,
    /// Output encoding.
    pub output_format: OutputFormat,
    /// Manning's n overrides for DAT feature codes.
    pub mannings: ManningOverrides,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            canonical: CanonicalSystem::default(),
            source_unit: None,
            default_datum: None,
            datum_offsets: BTreeMap::new(),
            strictness: Strictness::Lenient,
            elevation_range: None,
            precision: DEFAULT_PRECISION,
            output_format: OutputFormat::Text,
            mannings: ManningOverrides::default(),
        }
    }
}

impl ConversionOptions {
    /// Create options targeting the given canonical system.
    pub fn new(canonical: CanonicalSystem) -> Self {
        Self {
            canonical,
            ..Default::default()
        }
    }

    /// Plausible elevation window in canonical units.
    pub fn elevation_range(&self) -> ElevationRange {
        self.elevation_range
            .unwrap_or_else(|| ElevationRange::default_for(self.canonical.unit))
    }

    /// Output precision, clamped to the supported maximum.
    pub fn precision(&self) -> usize {
        self.precision.min(MAX_PRECISION)
    }

    /// Look up a configured offset for a named datum.
    pub fn datum_offset(&self, datum: &str) -> Option<f64> {
        self.datum_offsets
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(datum.trim()))
            .map(|(_, offset)| *offset)
    }
}

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Check if a is in range [min, max] with epsilon tolerance.
    #[inline]
    pub fn in_range(a: f64, min: f64, max: f64) -> bool {
        a >= min - EPS && a <= max + EPS
    }
}
