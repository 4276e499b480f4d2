//! Delimited text parser (station/elevation columns with a key=value header).

use crate::error::{ConvertError, Result};
use crate::model::{Bank, RawSample, RawSection};
use tracing::debug;

use super::fields::*;

/// Block header that starts a new section.
const SECTION_BLOCK: &str = "section";

/// Delimited text parser.
pub struct DelimitedParser<'a> {
    /// Input content as lines.
    lines: Vec<&'a str>,
    /// Section blocks: (header line index, first body line, last body line).
    blocks: Vec<(Option<usize>, usize, usize)>,
}

impl<'a> DelimitedParser<'a> {
    /// Create a new parser over the input content.
    pub fn new(content: &'a str) -> Result<Self> {
        let lines: Vec<&str> = content.lines().collect();
        let blocks = Self::find_blocks(&lines)?;
        Ok(Self { lines, blocks })
    }

    /// Find `[Section]` blocks and their line ranges.
    ///
    /// Without any block header the whole input is one section.
    fn find_blocks(lines: &[&str]) -> Result<Vec<(Option<usize>, usize, usize)>> {
        let mut blocks = Vec::new();
        let mut current: Option<usize> = None;

        for (i, line) in lines.iter().enumerate() {
            let Some(name) = parse_block_header(line) else {
                continue;
            };
            if !name.eq_ignore_ascii_case(SECTION_BLOCK) {
                return Err(ConvertError::parse(
                    i + 1,
                    format!("unknown block [{}], expected [Section]", name),
                ));
            }
            match current.replace(i) {
                Some(start) => blocks.push((Some(start), start + 1, i)),
                None => {
                    // Only comments may precede the first block header.
                    if let Some(stray) = lines[..i].iter().position(|l| !is_ignorable(l)) {
                        return Err(ConvertError::parse(
                            stray + 1,
                            "data before the first [Section] header",
                        ));
                    }
                }
            }
        }

        match current {
            Some(start) => blocks.push((Some(start), start + 1, lines.len())),
            None => blocks.push((None, 0, lines.len())),
        }

        Ok(blocks)
    }

    /// Parse all sections.
    pub fn parse(&self) -> Result<Vec<RawSection>> {
        let mut sections = Vec::with_capacity(self.blocks.len());

        for (idx, &(header_line, start, end)) in self.blocks.iter().enumerate() {
            let section = self.parse_block(idx + 1, start, end)?;
            if section.samples.is_empty() {
                return match header_line {
                    Some(line) => Err(ConvertError::parse(
                        line + 1,
                        format!("section {} has no data rows", section.id()),
                    )),
                    None => Err(ConvertError::EmptyInput),
                };
            }
            debug!(
                "Parsed section {} with {} rows",
                section.id(),
                section.samples.len()
            );
            sections.push(section);
        }

        Ok(sections)
    }

    /// Parse one block of lines `[start, end)` into a raw section.
    fn parse_block(&self, index: usize, start: usize, end: usize) -> Result<RawSection> {
        let mut section = RawSection::new(index);

        for (offset, line) in self.lines[start..end].iter().enumerate() {
            let line_no = start + offset + 1;
            if is_ignorable(line) {
                continue;
            }

            if let Some((key, value)) = parse_key_value(line) {
                apply_header(&mut section, key, value, line_no)?;
                continue;
            }

            let fields = split_fields(line);
            if section.samples.is_empty() && is_column_header(&fields) {
                continue;
            }
            section.samples.push(parse_row(&fields, line_no)?);
        }

        Ok(section)
    }
}

/// Check if a row names columns rather than carrying data.
fn is_column_header(fields: &[&str]) -> bool {
    fields
        .first()
        .is_some_and(|f| f.starts_with(|c: char| c.is_ascii_alphabetic()) && f.parse::<f64>().is_err())
}

/// Apply one header entry to the section.
fn apply_header(section: &mut RawSection, key: &str, value: &str, line: usize) -> Result<()> {
    let header = &mut section.header;
    match normalize_key(key).as_str() {
        "id" | "section" | "name" => header.id = non_empty(value),
        "unit" | "units" => {
            header.station_unit = non_empty(value);
            header.elevation_unit = non_empty(value);
        }
        "stationunit" => header.station_unit = non_empty(value),
        "elevationunit" => header.elevation_unit = non_empty(value),
        "datum" => header.datum = non_empty(value),
        "datumoffset" => header.datum_offset = parse_optional_number(value, line, "DatumOffset")?,
        "date" => header.date = non_empty(value),
        "chainage" => header.chainage = parse_optional_number(value, line, "Chainage")?,
        "waterlevel" => {
            header.water_level = parse_optional_number(value, line, "WaterLevel")?
        }
        "source" => header.source = non_empty(value),
        "samples" => {}
        _ => {
            header.attributes.insert(key.to_string(), value.to_string());
        }
    }
    Ok(())
}

/// Parse a data row: station, elevation[, roughness][, bank][, marker].
fn parse_row(fields: &[&str], line: usize) -> Result<RawSample> {
    if fields.len() < 2 || fields.len() > 5 {
        return Err(ConvertError::FieldCount {
            line,
            expected: "2 to 5".to_string(),
            found: fields.len(),
        });
    }

    let mut sample = RawSample::new(
        line,
        parse_number(fields[0], line, "station")?,
        parse_number(fields[1], line, "elevation")?,
    );

    if let Some(value) = fields.get(2) {
        sample.roughness = parse_optional_number(value, line, "roughness")?;
    }
    if let Some(value) = fields.get(3).filter(|v| !v.is_empty()) {
        sample.bank = Some(
            Bank::from_token(value)
                .ok_or_else(|| ConvertError::parse(line, format!("unrecognized bank '{}'", value)))?,
        );
    }
    if let Some(value) = fields.get(4) {
        sample.marker = non_empty(value);
    }

    Ok(sample)
}

/// Parse delimited text content.
pub fn parse_delimited(content: &str) -> Result<Vec<RawSection>> {
    DelimitedParser::new(content)?.parse()
}
