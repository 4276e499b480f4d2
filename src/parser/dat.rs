//! DAT survey record parser.
//!
//! A DAT file is a sequence of 6-field comma-separated records. `NEWSEC`
//! opens a section with its number, chainage and water level. `SECDATE`,
//! `SECBEARING` and `SECCOORDS` must follow once per section, `BEDMATERIAL`
//! may, and `XSS`/`XSN` records carry the surveyed points:
//!
//! ```text
//! # River Wye, June 2019
//! NEWSEC,2.003,1520,14.21,,
//! SECDATE,2019-06-12,,,,
//! SECBEARING,85,,,,
//! SECCOORDS,351022.1,402311.7,,,
//! XSS,0.0,16.02L,~SO*GL~,351020.0,402310.0
//! XSS,2.5,13.40,~GR*NO~,351021.2,402311.1
//! ```
//!
//! Lines starting with `#` or `;` are comments.

use crate::config::ManningOverrides;
use crate::error::{ConvertError, Result};
use crate::model::{Bank, RawSample, RawSection};
use std::collections::HashSet;
use tracing::debug;

use super::feature_codes::manning_roughness;
use super::fields::{non_empty, parse_number};

/// Fields per DAT record, identifier included.
const RECORD_FIELDS: usize = 6;

/// Metadata records that may appear once per section.
const METADATA_RECORDS: [&str; 4] = ["SECDATE", "BEDMATERIAL", "SECBEARING", "SECCOORDS"];

/// Metadata records every section must carry.
const REQUIRED_RECORDS: [&str; 3] = ["SECDATE", "SECBEARING", "SECCOORDS"];

/// Parse DAT content into raw sections using the built-in roughness tables.
pub fn parse_dat(content: &str) -> Result<Vec<RawSection>> {
    parse_dat_with(content, &ManningOverrides::default())
}

/// Parse DAT content into raw sections, applying Manning's n overrides.
pub fn parse_dat_with(content: &str, mannings: &ManningOverrides) -> Result<Vec<RawSection>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut sections: Vec<RawSection> = Vec::new();
    let mut seen_metadata: HashSet<&'static str> = HashSet::new();

    for record in reader.records() {
        let record = record.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line() as usize);
            ConvertError::parse(line, e.to_string())
        })?;
        let line = record.position().map_or(0, |p| p.line() as usize);

        if record.iter().all(str::is_empty) || is_comment(&record) {
            continue;
        }
        if record.len() != RECORD_FIELDS {
            return Err(ConvertError::FieldCount {
                line,
                expected: RECORD_FIELDS.to_string(),
                found: record.len(),
            });
        }

        let identifier = &record[0];
        if identifier.is_empty() {
            return Err(ConvertError::parse(line, "record identifier is empty"));
        }

        if identifier == "NEWSEC" {
            if let Some(previous) = sections.last() {
                check_required(previous, &seen_metadata)?;
            }
            sections.push(parse_newsec(&record, line, sections.len() + 1)?);
            seen_metadata.clear();
            continue;
        }

        let Some(section) = sections.last_mut() else {
            return Err(ConvertError::parse(
                line,
                format!("{} record before the first NEWSEC", identifier),
            ));
        };

        match identifier {
            "XSS" | "XSN" => section.samples.push(parse_point(&record, line, mannings)?),
            _ => {
                let Some(&key) = METADATA_RECORDS.iter().find(|k| **k == identifier) else {
                    debug!("Skipping {} record at line {}", identifier, line);
                    continue;
                };
                if !seen_metadata.insert(key) {
                    return Err(ConvertError::parse(
                        line,
                        format!("duplicate {} record in section {}", key, section.id()),
                    ));
                }
                apply_metadata(section, key, &record, line)?;
            }
        }
    }

    let Some(last) = sections.last() else {
        return Err(ConvertError::EmptyInput);
    };
    check_required(last, &seen_metadata)?;

    debug!("Parsed {} DAT section(s)", sections.len());
    Ok(sections)
}

fn is_comment(record: &csv::StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|first| first.starts_with('#') || first.starts_with(';'))
}

fn missing(section: &RawSection, field: &str) -> ConvertError {
    ConvertError::MissingField {
        section: section.id(),
        field: field.to_string(),
    }
}

/// Open a section from `NEWSEC,number,chainage,level,,`.
fn parse_newsec(record: &csv::StringRecord, line: usize, index: usize) -> Result<RawSection> {
    let mut section = RawSection::new(index);
    let id = non_empty(&record[1]).ok_or_else(|| missing(&section, "section number"))?;
    section.header.id = Some(id);
    if record[2].is_empty() {
        return Err(missing(&section, "chainage"));
    }
    if record[3].is_empty() {
        return Err(missing(&section, "water level"));
    }
    section.header.chainage = Some(parse_number(&record[2], line, "chainage")?);
    section.header.water_level = Some(parse_number(&record[3], line, "water level")?);
    Ok(section)
}

/// Fail if the section lacks one of the required metadata records.
fn check_required(section: &RawSection, seen: &HashSet<&'static str>) -> Result<()> {
    match REQUIRED_RECORDS.iter().find(|key| !seen.contains(*key)) {
        Some(key) => Err(missing(section, key)),
        None => Ok(()),
    }
}

/// Store a metadata record on the section header.
fn apply_metadata(
    section: &mut RawSection,
    key: &str,
    record: &csv::StringRecord,
    line: usize,
) -> Result<()> {
    match key {
        "SECDATE" => {
            let date = non_empty(&record[1]).ok_or_else(|| missing(section, "SECDATE"))?;
            section.header.date = Some(date);
        }
        "BEDMATERIAL" => {
            if let Some(v) = non_empty(&record[1]) {
                section.header.attributes.insert("BedMaterial".to_string(), v);
            }
        }
        "SECBEARING" => {
            let bearing = required_number(section, record, 1, line, "bearing")?;
            section.header.attributes.insert("Bearing".to_string(), bearing);
        }
        "SECCOORDS" => {
            let easting = required_number(section, record, 1, line, "easting")?;
            let northing = required_number(section, record, 2, line, "northing")?;
            section.header.attributes.insert("Easting".to_string(), easting);
            section.header.attributes.insert("Northing".to_string(), northing);
        }
        _ => {}
    }
    Ok(())
}

/// A numeric metadata field, checked and kept as written.
fn required_number(
    section: &RawSection,
    record: &csv::StringRecord,
    index: usize,
    line: usize,
    field: &'static str,
) -> Result<String> {
    let value = non_empty(&record[index]).ok_or_else(|| missing(section, field))?;
    parse_number(&value, line, field)?;
    Ok(value)
}

/// Parse an `XSS`/`XSN` point: offset, level[L|R], feature code, easting, northing.
fn parse_point(
    record: &csv::StringRecord,
    line: usize,
    mannings: &ManningOverrides,
) -> Result<RawSample> {
    if let Some(empty) = record.iter().position(str::is_empty) {
        return Err(ConvertError::parse(
            line,
            format!("field {} of a survey point is empty", empty + 1),
        ));
    }

    let level_code = &record[2];
    let (level, bank) = match level_code.char_indices().last() {
        Some((i, 'L')) => (&level_code[..i], Some(Bank::Left)),
        Some((i, 'R')) => (&level_code[..i], Some(Bank::Right)),
        _ => (level_code, None),
    };

    // Point coordinates are checked for well-formedness only.
    parse_number(&record[4], line, "easting")?;
    parse_number(&record[5], line, "northing")?;

    let feature_code = &record[3];
    Ok(RawSample {
        line,
        station: parse_number(&record[1], line, "offset")?,
        elevation: parse_number(level, line, "level")?,
        roughness: manning_roughness(feature_code, mannings),
        bank,
        marker: Some(feature_code.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_DAT: &str = "\
NEWSEC,1.001,250,12.5,,
SECDATE,2019-06-12,,,,
BEDMATERIAL,GR,,,,
SECBEARING,85,,,,
SECCOORDS,351022.1,402311.7,,,
XSS,0.0,14.20L,~SO*GL~,351020.0,402310.0
XSS,2.5,11.40,~GR*NO~,351021.2,402311.1
XSN,6.0,14.05R,~SO*TM~,351024.0,402313.0

NEWSEC,1.002,500,12.1,,
SECDATE,2019-06-12,,,,
SECBEARING,90,,,,
SECCOORDS,351100.0,402400.0,,,
XSS,0,13.1,~XX*NO~,1,1
XSS,4,13.3,~CC*NO~,1,1
";

    /// A section header with every required record, for small inputs.
    fn dat(number: &str, body: &str) -> String {
        format!(
            "NEWSEC,{number},0,0,,\nSECDATE,2020-01-01,,,,\nSECBEARING,0,,,,\nSECCOORDS,0,0,,,\n{body}"
        )
    }

    #[test]
    fn test_parse_sections_and_metadata() {
        let sections = parse_dat(SAMPLE_DAT).unwrap();
        assert_eq!(sections.len(), 2);

        let first = &sections[0];
        assert_eq!(first.id(), "1.001");
        assert_eq!(first.index, 1);
        assert_eq!(first.header.chainage, Some(250.0));
        assert_eq!(first.header.water_level, Some(12.5));
        assert_eq!(first.header.date.as_deref(), Some("2019-06-12"));
        assert_eq!(
            first.header.attributes.get("BedMaterial").map(String::as_str),
            Some("GR")
        );
        assert_eq!(
            first.header.attributes.get("Bearing").map(String::as_str),
            Some("85")
        );
        assert_eq!(
            first.header.attributes.get("Northing").map(String::as_str),
            Some("402311.7")
        );
        assert!(!first.header.attributes.contains_key("WaterLevel"));
        assert_eq!(first.header.station_unit, None);
        assert_eq!(first.samples.len(), 3);
        assert_eq!(sections[1].header.water_level, Some(12.1));
        assert_eq!(sections[1].samples.len(), 2);
    }

    #[test]
    fn test_parse_points() {
        let sections = parse_dat(SAMPLE_DAT).unwrap();
        let points = &sections[0].samples;
        assert_eq!(points[0].station, 0.0);
        assert_eq!(points[0].elevation, 14.2);
        assert_eq!(points[0].bank, Some(Bank::Left));
        assert_eq!(points[0].roughness, Some(0.05));
        assert_eq!(points[0].marker.as_deref(), Some("~SO*GL~"));
        assert_eq!(points[0].line, 6);
        assert_eq!(points[1].bank, None);
        assert_eq!(points[1].roughness, Some(0.035));
        assert_eq!(points[2].bank, Some(Bank::Right));
        assert_eq!(sections[1].samples[0].roughness, None);
    }

    #[test]
    fn test_manning_overrides_applied() {
        let mut mannings = ManningOverrides::default();
        mannings.vegetation.insert("GL".to_string(), 0.045);
        mannings.surface.insert("XX".to_string(), 0.02);

        let sections = parse_dat_with(SAMPLE_DAT, &mannings).unwrap();
        assert_eq!(sections[0].samples[0].roughness, Some(0.045));
        assert_eq!(sections[0].samples[1].roughness, Some(0.035));
        assert_eq!(sections[1].samples[0].roughness, Some(0.02));
    }

    #[test]
    fn test_comment_lines_skipped() {
        let content = format!(
            "# River Wye survey\n; exported 2019-06-14, unchecked\n{}",
            dat("1", "# left bank\nXSS,0,1,~GR*NO~,1,1\n;XSS,1,1,~GR*NO~,1,1\nXSS,2,1,~GR*NO~,1,1\n")
        );
        let sections = parse_dat(&content).unwrap();
        assert_eq!(sections.len(), 1);
        let stations: Vec<f64> = sections[0].samples.iter().map(|s| s.station).collect();
        assert_eq!(stations, vec![0.0, 2.0]);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_dat(&dat("1.001", "XSS,0.0,14.2,~GR*NO~,1\n")).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::FieldCount { line: 5, found: 5, .. }
        ));
    }

    #[test]
    fn test_empty_point_field() {
        let err = parse_dat(&dat("1.001", "XSS,0.0,,~GR*NO~,1,1\n")).unwrap_err();
        assert!(err.to_string().contains("field 3 of a survey point is empty"));
    }

    #[test]
    fn test_duplicate_metadata() {
        let err = parse_dat(&dat("1.001", "SECDATE,b,,,,\n")).unwrap_err();
        assert!(err.to_string().contains("duplicate SECDATE"));
    }

    #[test]
    fn test_metadata_resets_per_section() {
        let content = dat("1", "") + &dat("2", "").replace("2020-01-01", "2021-05-05");
        let sections = parse_dat(&content).unwrap();
        assert_eq!(sections[0].header.date.as_deref(), Some("2020-01-01"));
        assert_eq!(sections[1].header.date.as_deref(), Some("2021-05-05"));
    }

    #[test]
    fn test_missing_required_metadata() {
        for record in ["SECDATE", "SECBEARING", "SECCOORDS"] {
            let content: String = dat("7", "XSS,0,1,~GR*NO~,1,1\n")
                .lines()
                .filter(|l| !l.starts_with(record))
                .map(|l| format!("{l}\n"))
                .collect();
            match parse_dat(&content).unwrap_err() {
                ConvertError::MissingField { section, field } => {
                    assert_eq!(section, "7");
                    assert_eq!(field, record);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_missing_metadata_caught_before_next_section() {
        let content = "NEWSEC,1,0,0,,\nSECDATE,2020-01-01,,,,\n".to_string() + &dat("2", "");
        let err = parse_dat(&content).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MissingField { ref section, ref field }
                if section == "1" && field == "SECBEARING"
        ));
    }

    #[test]
    fn test_newsec_requires_chainage_and_level() {
        let err = parse_dat(&dat("1", "").replace("NEWSEC,1,0,0", "NEWSEC,1,,0")).unwrap_err();
        assert!(matches!(err, ConvertError::MissingField { ref field, .. } if field == "chainage"));

        let err = parse_dat(&dat("1", "").replace("NEWSEC,1,0,0", "NEWSEC,1,0,")).unwrap_err();
        assert!(
            matches!(err, ConvertError::MissingField { ref field, .. } if field == "water level")
        );
    }

    #[test]
    fn test_metadata_numbers_checked() {
        let err = parse_dat(&dat("1", "").replace("SECBEARING,0", "SECBEARING,north")).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidNumber { field: "bearing", line: 3, .. }
        ));

        let err = parse_dat(&dat("1", "").replace("SECCOORDS,0,0", "SECCOORDS,0,x")).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidNumber { field: "northing", .. }
        ));

        let err = parse_dat(&dat("1", "").replace("NEWSEC,1,0,0", "NEWSEC,1,0,high")).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidNumber { field: "water level", .. }
        ));
    }

    #[test]
    fn test_record_before_newsec() {
        let err = parse_dat("XSS,0.0,14.2,~GR*NO~,1,1\n").unwrap_err();
        assert!(err.to_string().contains("before the first NEWSEC"));
    }

    #[test]
    fn test_missing_section_number() {
        let err = parse_dat("NEWSEC,,250,12.5,,\n").unwrap_err();
        assert!(matches!(err, ConvertError::MissingField { .. }));
    }

    #[test]
    fn test_invalid_level() {
        let err = parse_dat(&dat("1", "XSS,0.0,high,~GR*NO~,1,1\n")).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidNumber { field: "level", .. }
        ));
    }

    #[test]
    fn test_unknown_records_skipped() {
        let sections = parse_dat(&dat("1", "COMMENT,x,,,,\nXSS,0,1,~GR*NO~,1,1\n")).unwrap();
        assert_eq!(sections[0].samples.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_dat("\n\n").unwrap_err(), ConvertError::EmptyInput));
        assert!(matches!(
            parse_dat("# nothing surveyed\n").unwrap_err(),
            ConvertError::EmptyInput
        ));
    }
}
