//! Parallel conversion of independent inputs.

use crate::config::ConversionOptions;
use crate::parser::InputFormat;
use crate::pipeline::{convert_file, ConversionResult};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// One input file and where its output goes.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: InputFormat,
}

impl BatchJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, format: InputFormat) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            format,
        }
    }

    /// Build a job, detecting the format from the input extension.
    pub fn detect(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Option<Self> {
        let input = input.into();
        let format = InputFormat::from_extension(&input)?;
        Some(Self::new(input, output, format))
    }
}

/// Result of one job in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: ConversionResult,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// Convert every job in parallel.
///
/// Runs share nothing but the options; results come back in job order.
pub fn run(jobs: &[BatchJob], options: &ConversionOptions) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = jobs
        .par_iter()
        .map(|job| BatchOutcome {
            input: job.input.clone(),
            output: job.output.clone(),
            result: convert_file(&job.input, &job.output, job.format, options),
        })
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    info!(
        "Batch finished: {} converted, {} failed",
        outcomes.len() - failed,
        failed
    );

    outcomes
}

/// Output path for `input` inside `dir`, keeping the file stem.
pub fn output_path(input: &Path, dir: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("section");
    dir.join(format!("{stem}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const GOOD: &str = "Id=XS1\nUnit=m\nDatum=NAVD88\n0,10\n5,9\n10,10\n";
    const REVERSED: &str = "Id=XS2\nUnit=m\nDatum=NAVD88\n0,10\n5,9\n3,10\n";

    #[test]
    fn test_batch_results_in_job_order() {
        let dir = TempDir::new().unwrap();
        let mut jobs = Vec::new();
        for i in 0..6 {
            let input = dir.path().join(format!("xs{i}.csv"));
            let content = if i % 2 == 0 { GOOD } else { REVERSED };
            fs::write(&input, content).unwrap();
            jobs.push(BatchJob::new(
                &input,
                output_path(&input, dir.path(), "out"),
                InputFormat::Delimited,
            ));
        }

        let outcomes = run(&jobs, &ConversionOptions::default());
        assert_eq!(outcomes.len(), 6);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.input, jobs[i].input);
            assert_eq!(outcome.is_success(), i % 2 == 0);
            assert_eq!(outcome.output.exists(), i % 2 == 0);
        }
        assert_eq!(
            outcomes[1].result.error().map(|e| e.kind()),
            Some(ErrorKind::ValidationRejection)
        );
    }

    #[test]
    fn test_missing_input_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.csv");
        fs::write(&good, GOOD).unwrap();
        let jobs = vec![
            BatchJob::new(
                dir.path().join("absent.csv"),
                dir.path().join("a.out"),
                InputFormat::Delimited,
            ),
            BatchJob::new(&good, dir.path().join("b.out"), InputFormat::Delimited),
        ];

        let outcomes = run(&jobs, &ConversionOptions::default());
        assert_eq!(outcomes[0].result.exit_code(), 1);
        assert!(outcomes[1].is_success());
    }

    #[test]
    fn test_detect_format() {
        let job = BatchJob::detect("survey/XS_Wye.dat", "out.csv").unwrap();
        assert_eq!(job.format, InputFormat::Dat);
        assert!(BatchJob::detect("survey/notes.docx", "out.csv").is_none());
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("in/xs1.dat"), Path::new("out"), "csv"),
            PathBuf::from("out/xs1.csv")
        );
    }
}
