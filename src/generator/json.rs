//! Canonical JSON output.
//!
//! JSON is an output encoding only. Unlike the text output it cannot be fed
//! back to the parsers; round trips go through [`super::render_text`].

use crate::config::LengthUnit;
use crate::error::{ConvertError, Result};
use crate::model::{Bank, ValidatedSection};
use crate::parser::feature_codes::cover_names;
use serde::Serialize;
use std::collections::BTreeMap;

use super::format::round_to;

/// Top-level JSON document.
#[derive(Debug, Serialize)]
struct Document<'a> {
    creator: &'static str,
    version: &'static str,
    sections: Vec<SectionDoc<'a>>,
}

#[derive(Debug, Serialize)]
struct SectionDoc<'a> {
    id: &'a str,
    station_unit: LengthUnit,
    elevation_unit: LengthUnit,
    datum: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chainage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    water_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: &'a BTreeMap<String, String>,
    samples: Vec<SampleDoc<'a>>,
}

#[derive(Debug, Serialize)]
struct SampleDoc<'a> {
    station: f64,
    elevation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    roughness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank: Option<Bank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker: Option<&'a str>,
    /// Surface material named by a DAT feature code.
    #[serde(skip_serializing_if = "Option::is_none")]
    ground: Option<&'static str>,
    /// Vegetation named by a DAT feature code.
    #[serde(skip_serializing_if = "Option::is_none")]
    vegetation: Option<&'static str>,
}

impl<'a> SectionDoc<'a> {
    fn new(section: &'a ValidatedSection, precision: usize) -> Self {
        let header = &section.header;
        Self {
            id: &header.id,
            station_unit: header.station_unit,
            elevation_unit: header.elevation_unit,
            datum: &header.datum,
            date: header.date.as_deref(),
            chainage: header.chainage.map(|c| round_to(c, precision)),
            water_level: header.water_level.map(|w| round_to(w, precision)),
            source: header.source.as_deref(),
            attributes: &header.attributes,
            samples: section
                .samples
                .iter()
                .map(|s| {
                    let (ground, vegetation) = s
                        .marker
                        .as_deref()
                        .and_then(cover_names)
                        .unwrap_or_default();
                    SampleDoc {
                        station: round_to(s.station, precision),
                        elevation: round_to(s.elevation, precision),
                        roughness: s.roughness,
                        bank: s.bank,
                        marker: s.marker.as_deref(),
                        ground,
                        vegetation,
                    }
                })
                .collect(),
        }
    }
}

/// Render sections as a pretty-printed JSON document.
pub fn render_json(sections: &[ValidatedSection], precision: usize) -> Result<String> {
    let document = Document {
        creator: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        sections: sections
            .iter()
            .map(|s| SectionDoc::new(s, precision))
            .collect(),
    };

    let mut output = serde_json::to_string_pretty(&document)
        .map_err(|e| ConvertError::Serialization(e.into()))?;
    output.push('\n');
    Ok(output)
}
