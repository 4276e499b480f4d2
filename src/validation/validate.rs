//! Geometry validation for normalized sections.

use crate::config::{float_cmp, ConversionOptions, ElevationRange, Strictness, DEFAULT_PRECISION};
use crate::error::{ConvertError, Result};
use crate::generator::format_fixed;
use crate::model::{Diagnostic, DiagnosticKind, Sample, Section, Severity, ValidatedSection};
use tracing::debug;

/// Minimum samples for a section to describe at least one interval.
pub const MIN_SAMPLES: usize = 2;

/// Failure policy: maps each anomaly to a severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPolicy {
    pub strictness: Strictness,
    pub elevation_range: ElevationRange,
    /// Output decimals; stations written identically are duplicates.
    pub precision: usize,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            strictness: Strictness::Lenient,
            elevation_range: ElevationRange::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

impl ValidationPolicy {
    /// Build the policy for a conversion run.
    pub fn from_options(options: &ConversionOptions) -> Self {
        Self {
            strictness: options.strictness,
            elevation_range: options.elevation_range(),
            precision: options.precision(),
        }
    }

    /// Check whether two stations coincide, either within tolerance or once
    /// written at the output precision.
    pub fn same_station(&self, a: f64, b: f64) -> bool {
        float_cmp::approx_eq(a, b)
            || format_fixed(a, self.precision) == format_fixed(b, self.precision)
    }

    /// Severity of an anomaly under this policy.
    pub fn severity(&self, kind: &DiagnosticKind) -> Severity {
        match kind {
            DiagnosticKind::DuplicateStation { .. } => Severity::Corrected,
            DiagnosticKind::ElevationOutOfRange { .. } => match self.strictness {
                Strictness::Lenient => Severity::Informational,
                Strictness::Strict => Severity::Rejected,
            },
            DiagnosticKind::NonMonotonic { .. }
            | DiagnosticKind::NonFinite { .. }
            | DiagnosticKind::TooFewSamples { .. } => Severity::Rejected,
        }
    }
}

/// Validation outcome for one section.
#[derive(Debug)]
pub struct ValidationResult {
    /// The finalized section, absent when rejected.
    pub section: Option<ValidatedSection>,
    /// Everything detected, in check order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Whether the section was accepted.
    pub fn passed(&self) -> bool {
        self.section.is_some()
    }

    /// Diagnostics with the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity == severity)
    }

    /// Turn a rejection into an error carrying the diagnostics.
    pub fn into_result(self) -> Result<(ValidatedSection, Vec<Diagnostic>)> {
        match self.section {
            Some(section) => Ok((section, self.diagnostics)),
            None => Err(ConvertError::Rejected {
                section: self
                    .diagnostics
                    .first()
                    .map(|d| d.section.clone())
                    .unwrap_or_default(),
                diagnostics: self.diagnostics,
            }),
        }
    }
}

/// Collects diagnostics for one section, applying the policy.
struct Collector<'a> {
    section: &'a str,
    policy: &'a ValidationPolicy,
    diagnostics: Vec<Diagnostic>,
}

impl Collector<'_> {
    fn record(&mut self, kind: DiagnosticKind) {
        let severity = self.policy.severity(&kind);
        self.diagnostics
            .push(Diagnostic::new(self.section, severity, kind));
    }

    fn rejected(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_rejection)
    }
}

/// Validate a normalized section.
///
/// Checks run in order: non-finite values, duplicate stations (first
/// occurrence kept), strictly increasing stations, elevation range, and
/// minimum sample count. All checks run; any rejected diagnostic rejects
/// the section.
pub fn validate_section(section: Section, policy: &ValidationPolicy) -> ValidationResult {
    let Section { header, samples } = section;
    let mut collector = Collector {
        section: &header.id,
        policy,
        diagnostics: Vec::new(),
    };

    let finite = drop_non_finite(samples, &mut collector);
    let merged = merge_duplicates(finite, &mut collector);
    check_monotonic(&merged, &mut collector);
    check_elevations(&merged, &mut collector);
    if merged.len() < MIN_SAMPLES {
        collector.record(DiagnosticKind::TooFewSamples {
            count: merged.len(),
        });
    }

    let rejected = collector.rejected();
    let diagnostics = collector.diagnostics;
    debug!(
        "Validated section {}: {} sample(s), {} diagnostic(s), {}",
        header.id,
        merged.len(),
        diagnostics.len(),
        if rejected { "rejected" } else { "accepted" }
    );

    ValidationResult {
        section: (!rejected).then(|| ValidatedSection::new(Section::new(header, merged))),
        diagnostics,
    }
}

/// Remove samples whose station or elevation is not a finite number.
fn drop_non_finite(samples: Vec<Sample>, collector: &mut Collector) -> Vec<Sample> {
    samples
        .into_iter()
        .filter(|s| {
            if s.is_finite() {
                true
            } else {
                collector.record(DiagnosticKind::NonFinite { line: s.line });
                false
            }
        })
        .collect()
}

/// Merge samples sharing a station, keeping the first occurrence.
fn merge_duplicates(samples: Vec<Sample>, collector: &mut Collector) -> Vec<Sample> {
    let mut kept: Vec<Sample> = Vec::with_capacity(samples.len());
    let policy = collector.policy;

    for sample in samples {
        match kept
            .iter()
            .find(|k| policy.same_station(k.station, sample.station))
        {
            Some(first) => collector.record(DiagnosticKind::DuplicateStation {
                station: first.station,
                kept_line: first.line,
                dropped_line: sample.line,
            }),
            None => kept.push(sample),
        }
    }

    kept
}

/// Report the first pair of consecutive samples whose station does not increase.
fn check_monotonic(samples: &[Sample], collector: &mut Collector) {
    if let Some(pair) = samples.windows(2).find(|w| w[1].station <= w[0].station) {
        collector.record(DiagnosticKind::NonMonotonic {
            previous_station: pair[0].station,
            station: pair[1].station,
            previous_line: pair[0].line,
            line: pair[1].line,
        });
    }
}

/// Flag elevations outside the plausible range.
fn check_elevations(samples: &[Sample], collector: &mut Collector) {
    let range = collector.policy.elevation_range;
    for sample in samples.iter().filter(|s| !range.contains(s.elevation)) {
        collector.record(DiagnosticKind::ElevationOutOfRange {
            station: sample.station,
            elevation: sample.elevation,
            min: range.min,
            max: range.max,
            line: sample.line,
        });
    }
}
