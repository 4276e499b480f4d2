//! Canonical delimited text output.
//!
//! The output is itself a valid delimited input, so converting it again
//! yields the same sections.

use crate::model::ValidatedSection;
use std::fmt::Write;

use super::format::{format_fixed, format_trimmed, ROUGHNESS_DECIMALS};

/// Column header row written above the samples.
pub const COLUMNS: &str = "station,elevation,roughness,bank,marker";

/// Render sections as canonical delimited text.
pub fn render_text(sections: &[ValidatedSection], precision: usize) -> String {
    let mut output = String::new();

    writeln!(output, "# Creator: xsec-convert-rs {}", env!("CARGO_PKG_VERSION")).unwrap();

    for section in sections {
        writeln!(output).unwrap();
        write_section(&mut output, section, precision);
    }

    output
}

/// Write one `[Section]` block.
fn write_section(output: &mut String, section: &ValidatedSection, precision: usize) {
    let header = &section.header;

    writeln!(output, "[Section]").unwrap();
    writeln!(output, "Id={}", header.id).unwrap();
    writeln!(output, "StationUnit={}", header.station_unit).unwrap();
    writeln!(output, "ElevationUnit={}", header.elevation_unit).unwrap();
    writeln!(output, "Datum={}", header.datum).unwrap();
    if let Some(date) = &header.date {
        writeln!(output, "Date={}", date).unwrap();
    }
    if let Some(chainage) = header.chainage {
        writeln!(output, "Chainage={}", format_fixed(chainage, precision)).unwrap();
    }
    if let Some(level) = header.water_level {
        writeln!(output, "WaterLevel={}", format_fixed(level, precision)).unwrap();
    }
    if let Some(source) = &header.source {
        writeln!(output, "Source={}", source).unwrap();
    }
    for (key, value) in &header.attributes {
        writeln!(output, "{}={}", key, value).unwrap();
    }
    writeln!(output, "Samples={}", section.len()).unwrap();
    writeln!(output, "{}", COLUMNS).unwrap();

    for sample in &section.samples {
        writeln!(
            output,
            "{},{},{},{},{}",
            format_fixed(sample.station, precision),
            format_fixed(sample.elevation, precision),
            sample
                .roughness
                .map(|n| format_trimmed(n, ROUGHNESS_DECIMALS))
                .unwrap_or_default(),
            sample.bank.map(|b| b.label()).unwrap_or_default(),
            sample
                .marker
                .as_deref()
                .map(|m| m.replace(',', ";"))
                .unwrap_or_default(),
        )
        .unwrap();
    }
}
