//! Canonical output generation.

mod format;
mod json;
mod text;

pub use format::{format_fixed, format_trimmed, round_to};
pub use json::render_json;
pub use text::{render_text, COLUMNS};

use crate::config::{ConversionOptions, OutputFormat};
use crate::error::{ConvertError, Result};
use crate::model::ValidatedSection;
use std::io::Write;

/// Render validated sections in the configured output format.
pub fn render(sections: &[ValidatedSection], options: &ConversionOptions) -> Result<String> {
    match options.output_format {
        OutputFormat::Text => Ok(render_text(sections, options.precision())),
        OutputFormat::Json => render_json(sections, options.precision()),
    }
}

/// Write rendered output to its destination.
pub fn write_rendered<W: Write>(rendered: &str, mut writer: W) -> Result<()> {
    writer
        .write_all(rendered.as_bytes())
        .map_err(ConvertError::Serialization)?;
    writer.flush().map_err(ConvertError::Serialization)
}

/// Render and write validated sections.
///
/// Output is rendered in memory first, so only destination I/O can fail.
pub fn write_sections<W: Write>(
    sections: &[ValidatedSection],
    options: &ConversionOptions,
    writer: W,
) -> Result<()> {
    let rendered = render(sections, options)?;
    write_rendered(&rendered, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LengthUnit;
    use crate::error::ErrorKind;
    use crate::model::{Sample, Section, SectionHeader};
    use std::io;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn section() -> ValidatedSection {
        ValidatedSection::new(Section::new(
            SectionHeader::new("XS1", LengthUnit::Meters, "NAVD88"),
            vec![Sample::new(0.0, 1.0), Sample::new(1.0, 2.0)],
        ))
    }

    #[test]
    fn test_write_sections_to_buffer() {
        let mut buffer = Vec::new();
        write_sections(&[section()], &ConversionOptions::default(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("[Section]"));
        assert!(text.contains("1.000,2.000,,,"));
    }

    #[test]
    fn test_render_selects_json() {
        let options = ConversionOptions {
            output_format: OutputFormat::Json,
            ..Default::default()
        };
        let rendered = render(&[section()], &options).unwrap();
        assert!(rendered.trim_start().starts_with('{'));
    }

    #[test]
    fn test_io_failure_is_serialization_error() {
        let err = write_sections(&[section()], &ConversionOptions::default(), FailingWriter)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert!(err.to_string().contains("disk full"));
    }
}
