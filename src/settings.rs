//! TOML settings file for the command line tool.
//!
//! ```toml
//! # xsec-convert.toml
//! log_level = "debug"
//!
//! [conversion]
//! source_unit = "ft"
//! default_datum = "NGVD29"
//! strictness = "strict"
//! precision = 2
//!
//! [conversion.canonical]
//! unit = "m"
//! datum = "NAVD88"
//!
//! [conversion.datum_offsets]
//! NGVD29 = -0.23
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use xsec_convert_rs::ConversionOptions;

/// Root of an `xsec-convert.toml` file.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Log filter used when neither `RUST_LOG` nor `--verbose` is given.
    pub log_level: Option<String>,

    /// Conversion options; command line flags override these.
    #[serde(default)]
    pub conversion: ConversionOptions,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xsec_convert_rs::{LengthUnit, OutputFormat, Strictness};

    #[test]
    fn test_parse_settings() {
        let toml = r#"
            log_level = "debug"

            [conversion]
            source_unit = "ft"
            default_datum = "NGVD29"
            strictness = "strict"
            precision = 2
            output_format = "json"

            [conversion.canonical]
            unit = "usft"
            datum = "NAVD88"

            [conversion.datum_offsets]
            NGVD29 = -0.23

            [conversion.elevation_range]
            min = -10.0
            max = 500.0

            [conversion.mannings.surface]
            GR = 0.04

            [conversion.mannings.vegetation]
            GL = 0.045
        "#;

        let settings = Settings::from_toml(toml).unwrap();
        let conversion = &settings.conversion;
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
        assert_eq!(conversion.source_unit, Some(LengthUnit::Feet));
        assert_eq!(conversion.default_datum.as_deref(), Some("NGVD29"));
        assert_eq!(conversion.strictness, Strictness::Strict);
        assert_eq!(conversion.precision, 2);
        assert_eq!(conversion.output_format, OutputFormat::Json);
        assert_eq!(conversion.canonical.unit, LengthUnit::UsSurveyFeet);
        assert_eq!(conversion.datum_offset("ngvd29"), Some(-0.23));
        assert_eq!(conversion.elevation_range().max, 500.0);
        assert_eq!(conversion.mannings.surface("GR"), Some(0.04));
        assert_eq!(conversion.mannings.vegetation("GL"), Some(0.045));
    }

    #[test]
    fn test_partial_settings() {
        let toml = r#"
            [conversion]
            precision = 4
        "#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.log_level, None);
        assert_eq!(settings.conversion.precision, 4);
        assert_eq!(settings.conversion.canonical.datum, "NAVD88");
        assert_eq!(settings.conversion.canonical.unit, LengthUnit::Meters);
        assert!(settings.conversion.mannings.is_empty());
    }

    #[test]
    fn test_empty_settings() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.conversion, ConversionOptions::default());
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let toml = r#"
            [conversion]
            source_unit = "furlong"
        "#;

        assert!(Settings::from_toml(toml).is_err());
    }
}
