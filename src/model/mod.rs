//! Data model types for cross-section conversion.

mod diagnostic;
mod sample;
mod section;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use sample::{Bank, RawSample, Sample};
pub use section::{RawHeader, RawSection, Section, SectionHeader, ValidatedSection};
