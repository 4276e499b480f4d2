//! Unit and datum normalization into the canonical system.

use crate::config::{CanonicalSystem, ConversionOptions, LengthUnit};
use crate::error::{ConvertError, Result};
use crate::model::{RawSection, Sample, Section, SectionHeader};
use tracing::debug;

/// Resolve a raw section's units and datum and convert it to the canonical system.
pub fn normalize(raw: RawSection, options: &ConversionOptions) -> Result<Section> {
    let id = raw.id();
    let station_unit = resolve_unit(raw.header.station_unit.as_deref(), options, &id)?;
    let elevation_unit = resolve_unit(raw.header.elevation_unit.as_deref(), options, &id)?;

    let datum = match raw.header.datum.clone().or_else(|| options.default_datum.clone()) {
        Some(datum) => datum,
        None => return Err(ConvertError::MissingDatum { section: id }),
    };
    let offset = datum_offset(
        &datum,
        raw.header.datum_offset,
        elevation_unit,
        options,
        &id,
    )?;

    let header = SectionHeader {
        id,
        station_unit,
        elevation_unit,
        datum,
        date: raw.header.date,
        chainage: raw.header.chainage,
        water_level: raw.header.water_level,
        source: raw.header.source,
        attributes: raw.header.attributes,
    };
    let samples = raw.samples.into_iter().map(Sample::from).collect();

    Ok(to_canonical(
        Section::new(header, samples),
        offset,
        &options.canonical,
    ))
}

/// Convert an already resolved section to the canonical system.
///
/// A section that is already canonical comes back unchanged.
pub fn normalize_section(section: Section, options: &ConversionOptions) -> Result<Section> {
    let offset = datum_offset(
        &section.header.datum,
        None,
        section.header.elevation_unit,
        options,
        &section.header.id,
    )?;
    Ok(to_canonical(section, offset, &options.canonical))
}

/// Check whether a section is already expressed in the canonical system.
pub fn is_canonical(section: &Section, system: &CanonicalSystem) -> bool {
    section.header.station_unit == system.unit
        && section.header.elevation_unit == system.unit
        && system.is_canonical_datum(&section.header.datum)
}

/// Resolve a declared unit, falling back to the configured source unit.
fn resolve_unit(
    declared: Option<&str>,
    options: &ConversionOptions,
    section: &str,
) -> Result<LengthUnit> {
    match declared {
        Some(label) => LengthUnit::from_label(label).ok_or_else(|| ConvertError::UnknownUnit {
            section: section.to_string(),
            unit: label.to_string(),
        }),
        None => options.source_unit.ok_or_else(|| ConvertError::MissingUnit {
            section: section.to_string(),
        }),
    }
}

/// Offset to add to canonical-unit elevations to reach the canonical datum.
///
/// `declared` is a header offset in the section's elevation unit.
fn datum_offset(
    datum: &str,
    declared: Option<f64>,
    elevation_unit: LengthUnit,
    options: &ConversionOptions,
    section: &str,
) -> Result<f64> {
    let canonical = &options.canonical;
    if canonical.is_canonical_datum(datum) {
        return Ok(0.0);
    }
    if let Some(offset) = declared {
        return Ok(offset * elevation_unit.factor_to(canonical.unit));
    }
    options
        .datum_offset(datum)
        .ok_or_else(|| ConvertError::UnknownDatum {
            section: section.to_string(),
            datum: datum.to_string(),
            canonical: canonical.datum.clone(),
        })
}

/// Rescale stations and elevations and relabel the header.
fn to_canonical(mut section: Section, datum_offset: f64, system: &CanonicalSystem) -> Section {
    let station_factor = section.header.station_unit.factor_to(system.unit);
    let elevation_factor = section.header.elevation_unit.factor_to(system.unit);

    if station_factor == 1.0 && elevation_factor == 1.0 && datum_offset == 0.0 {
        section.header.station_unit = system.unit;
        section.header.elevation_unit = system.unit;
        section.header.datum = system.datum.clone();
        return section;
    }

    debug!(
        "Normalizing section {}: stations {} -> {}, elevations {} -> {}, datum {} -> {} ({:+})",
        section.header.id,
        section.header.station_unit,
        system.unit,
        section.header.elevation_unit,
        system.unit,
        section.header.datum,
        system.datum,
        datum_offset
    );

    for sample in &mut section.samples {
        sample.station *= station_factor;
        sample.elevation = sample.elevation * elevation_factor + datum_offset;
    }
    section.header.chainage = section.header.chainage.map(|c| c * station_factor);
    section.header.water_level = section
        .header
        .water_level
        .map(|w| w * elevation_factor + datum_offset);
    section.header.station_unit = system.unit;
    section.header.elevation_unit = system.unit;
    section.header.datum = system.datum.clone();

    section
}
