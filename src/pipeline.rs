//! Conversion pipeline: parse, normalize, validate, serialize.

use crate::config::ConversionOptions;
use crate::error::{ConvertError, Result};
use crate::generator;
use crate::model::{Diagnostic, Severity, ValidatedSection};
use crate::parser::{parse_sections_with, InputFormat};
use crate::transform::normalize;
use crate::validation::{validate_section, ValidationPolicy};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Successful conversion output.
#[derive(Debug)]
pub struct Converted {
    /// Finalized sections, in input order.
    pub sections: Vec<ValidatedSection>,
    /// The artifact as written to the destination.
    pub rendered: String,
}

/// How a conversion run ended.
#[derive(Debug)]
pub enum Outcome {
    Converted(Converted),
    Failed(ConvertError),
}

/// Outcome of one conversion run, with every diagnostic gathered.
#[derive(Debug)]
pub struct ConversionResult {
    /// Diagnostics up to success or the failure point.
    pub diagnostics: Vec<Diagnostic>,
    pub outcome: Outcome,
}

impl ConversionResult {
    /// A run that failed before producing diagnostics.
    pub fn failed(error: ConvertError) -> Self {
        Self {
            diagnostics: Vec::new(),
            outcome: Outcome::Failed(error),
        }
    }

    /// Whether the artifact was produced.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Converted(_))
    }

    /// Finalized sections; empty on failure.
    pub fn sections(&self) -> &[ValidatedSection] {
        match &self.outcome {
            Outcome::Converted(converted) => &converted.sections,
            Outcome::Failed(_) => &[],
        }
    }

    /// Rendered artifact, if produced.
    pub fn rendered(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Converted(converted) => Some(&converted.rendered),
            Outcome::Failed(_) => None,
        }
    }

    /// The fatal error, if the run failed.
    pub fn error(&self) -> Option<&ConvertError> {
        match &self.outcome {
            Outcome::Converted(_) => None,
            Outcome::Failed(err) => Some(err),
        }
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Process exit status: 0 on success, the error code otherwise.
    pub fn exit_code(&self) -> i32 {
        self.error().map_or(0, ConvertError::code)
    }

    /// Split into the converted output or the fatal error.
    pub fn into_result(self) -> Result<(Converted, Vec<Diagnostic>)> {
        match self.outcome {
            Outcome::Converted(converted) => Ok((converted, self.diagnostics)),
            Outcome::Failed(err) => Err(err),
        }
    }
}

/// One configured conversion.
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    format: InputFormat,
    options: &'a ConversionOptions,
    source: Option<String>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline for the given input format.
    pub fn new(format: InputFormat, options: &'a ConversionOptions) -> Self {
        Self {
            format,
            options,
            source: None,
        }
    }

    /// Record a provenance for sections that do not declare one.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Convert one input stream into one output artifact.
    ///
    /// Output is written only when every section in the input validates.
    pub fn convert<R: Read, W: Write>(&self, input: R, output: W) -> ConversionResult {
        let mut diagnostics = Vec::new();
        let outcome = match self.run(input, output, &mut diagnostics) {
            Ok(converted) => Outcome::Converted(converted),
            Err(err) => Outcome::Failed(err),
        };
        ConversionResult {
            diagnostics,
            outcome,
        }
    }

    fn run<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Converted> {
        let raw_sections = parse_sections_with(input, self.format, &self.options.mannings)?;
        debug!(
            "Parsed {} section(s) as {}",
            raw_sections.len(),
            self.format
        );

        let policy = ValidationPolicy::from_options(self.options);
        let mut sections = Vec::with_capacity(raw_sections.len());

        for mut raw in raw_sections {
            if raw.header.source.is_none() {
                raw.header.source = self.source.clone();
            }

            let section = normalize(raw, self.options)?;
            let result = validate_section(section, &policy);

            for diagnostic in &result.diagnostics {
                match diagnostic.severity {
                    Severity::Informational => info!("{}", diagnostic),
                    Severity::Corrected | Severity::Rejected => warn!("{}", diagnostic),
                }
            }
            diagnostics.extend(result.diagnostics.iter().cloned());

            let (section, _) = result.into_result()?;
            if let Some((low, high)) = section.elevation_bounds() {
                debug!(
                    "Section {}: {} sample(s), elevations {} to {} {}",
                    section.id(),
                    section.len(),
                    low,
                    high,
                    section.header.elevation_unit
                );
            }
            sections.push(section);
        }

        let rendered = generator::render(&sections, self.options)?;
        generator::write_rendered(&rendered, output)?;

        info!(
            "Converted {} section(s), {} sample(s)",
            sections.len(),
            sections.iter().map(|s| s.len()).sum::<usize>()
        );

        Ok(Converted { sections, rendered })
    }
}

/// Convert one input stream into one output artifact.
pub fn convert<R: Read, W: Write>(
    input: R,
    output: W,
    format: InputFormat,
    options: &ConversionOptions,
) -> ConversionResult {
    Pipeline::new(format, options).convert(input, output)
}

/// Convert a file, writing the output file only on success.
///
/// The artifact goes to a temporary file next to `output` and is renamed
/// into place, so a failed write never leaves a partial file behind.
pub fn convert_file(
    input: &Path,
    output: &Path,
    format: InputFormat,
    options: &ConversionOptions,
) -> ConversionResult {
    let mut buffer = Vec::new();
    let mut result = convert_path(input, &mut buffer, format, options);

    if result.is_success() {
        if let Err(err) = persist(output, &buffer) {
            result.outcome = Outcome::Failed(ConvertError::Serialization(err));
        } else {
            debug!("Wrote {}", output.display());
        }
    }

    result
}

/// Write `contents` to `path` through a temporary file in the same directory.
fn persist(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Run a file through every stage without writing any output.
pub fn check_file(
    input: &Path,
    format: InputFormat,
    options: &ConversionOptions,
) -> ConversionResult {
    convert_path(input, io::sink(), format, options)
}

fn convert_path<W: Write>(
    input: &Path,
    output: W,
    format: InputFormat,
    options: &ConversionOptions,
) -> ConversionResult {
    if !input.exists() {
        return ConversionResult::failed(ConvertError::FileNotFound {
            path: input.to_path_buf(),
        });
    }

    let file = match File::open(input) {
        Ok(file) => file,
        Err(err) => return ConversionResult::failed(err.into()),
    };

    let source = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("input");

    Pipeline::new(format, options)
        .with_source(source)
        .convert(BufReader::new(file), output)
}
