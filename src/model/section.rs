//! Section - one cross-section profile with its header metadata.

use super::{RawSample, Sample};
use crate::config::LengthUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Header fields as declared in the input, unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHeader {
    /// Section identifier.
    pub id: Option<String>,
    /// Declared unit for stations.
    pub station_unit: Option<String>,
    /// Declared unit for elevations.
    pub elevation_unit: Option<String>,
    /// Declared vertical datum.
    pub datum: Option<String>,
    /// Offset from the declared datum to the canonical datum, in elevation units.
    pub datum_offset: Option<f64>,
    /// Survey date, verbatim.
    pub date: Option<String>,
    /// Distance along the river, in station units.
    pub chainage: Option<f64>,
    /// Water surface level at survey time, in elevation units and the declared datum.
    pub water_level: Option<f64>,
    /// Provenance of the data.
    pub source: Option<String>,
    /// Any other header entries, verbatim.
    pub attributes: BTreeMap<String, String>,
}

/// An unvalidated section straight from the parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSection {
    /// Position of the section in its input (1-based).
    pub index: usize,
    pub header: RawHeader,
    pub samples: Vec<RawSample>,
}

impl RawSection {
    /// Create an empty section at the given input position.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Identifier used in diagnostics; falls back to the input position.
    pub fn id(&self) -> String {
        match &self.header.id {
            Some(id) => id.clone(),
            None => format!("#{}", self.index),
        }
    }
}

/// Header with units and datum fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionHeader {
    pub id: String,
    pub station_unit: LengthUnit,
    pub elevation_unit: LengthUnit,
    pub datum: String,
    pub date: Option<String>,
    pub chainage: Option<f64>,
    pub water_level: Option<f64>,
    pub source: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl SectionHeader {
    /// Create a header with the same unit for stations and elevations.
    pub fn new(id: impl Into<String>, unit: LengthUnit, datum: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            station_unit: unit,
            elevation_unit: unit,
            datum: datum.into(),
            date: None,
            chainage: None,
            water_level: None,
            source: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// Ordered samples plus resolved header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub header: SectionHeader,
    pub samples: Vec<Sample>,
}

impl Section {
    /// Create a section.
    pub fn new(header: SectionHeader, samples: Vec<Sample>) -> Self {
        Self { header, samples }
    }

    /// Section identifier.
    pub fn id(&self) -> &str {
        &self.header.id
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the section has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Lowest and highest elevation, if any samples exist.
    pub fn elevation_bounds(&self) -> Option<(f64, f64)> {
        self.samples.iter().map(|s| s.elevation).fold(None, |acc, e| match acc {
            None => Some((e, e)),
            Some((lo, hi)) => Some((lo.min(e), hi.max(e))),
        })
    }
}

/// A section that passed validation.
///
/// Stations are strictly increasing, there are at least two samples, every
/// elevation is finite and units are resolved. Only the validator builds
/// one, and it hands out read-only access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedSection(Section);

impl ValidatedSection {
    pub(crate) fn new(section: Section) -> Self {
        Self(section)
    }

    /// Give back the underlying section.
    pub fn into_inner(self) -> Section {
        self.0
    }
}

impl Deref for ValidatedSection {
    type Target = Section;

    fn deref(&self) -> &Section {
        &self.0
    }
}
