//! xsec-convert - CLI tool to convert river cross-section surveys.

mod settings;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use settings::Settings;
use xsec_convert_rs::batch::{self, BatchJob};
use xsec_convert_rs::config::MAX_PRECISION;
use xsec_convert_rs::{
    check_file, ConversionOptions, ConversionResult, Diagnostic, InputFormat, LengthUnit,
    OutputFormat, Strictness,
};

/// Convert river cross-section surveys to a canonical, validated format.
#[derive(Parser, Debug)]
#[command(name = "xsec-convert")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input survey file(s)
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Output file path (single input only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for output files (defaults to each input's directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Input format (delimited or dat); detected from the extension if omitted
    #[arg(short, long)]
    format: Option<InputFormat>,

    /// Reject sections with implausible elevations
    #[arg(long)]
    strict: bool,

    /// Unit assumed when an input declares none
    #[arg(long)]
    unit: Option<LengthUnit>,

    /// Datum assumed when an input declares none
    #[arg(long)]
    datum: Option<String>,

    /// Canonical output unit
    #[arg(long)]
    to_unit: Option<LengthUnit>,

    /// Canonical output datum
    #[arg(long)]
    to_datum: Option<String>,

    /// Write JSON instead of delimited text
    #[arg(long)]
    json: bool,

    /// Decimal places for stations and elevations
    #[arg(long)]
    precision: Option<usize>,

    /// Write a JSON diagnostics report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Validate only, don't write output
    #[arg(long)]
    validate: bool,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// One entry of the `--report` document.
#[derive(Debug, Serialize)]
struct ReportEntry<'a> {
    input: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
    success: bool,
    code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    diagnostics: &'a [Diagnostic],
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    init_logging(args.verbose, settings.log_level.as_deref());

    let options = build_options(&args, settings.conversion);
    if args.precision.is_some_and(|p| p > MAX_PRECISION) {
        warn!(
            "Precision {} exceeds the maximum, using {}",
            options.precision, MAX_PRECISION
        );
    }

    let jobs = build_jobs(&args, &options)?;
    info!(
        "Converting {} file(s) to {} / {}",
        jobs.len(),
        options.canonical.unit,
        options.canonical.datum
    );

    let results: Vec<(&BatchJob, ConversionResult)> = if args.validate {
        jobs.iter()
            .map(|job| (job, check_file(&job.input, job.format, &options)))
            .collect()
    } else {
        jobs.iter()
            .zip(batch::run(&jobs, &options))
            .map(|(job, outcome)| (job, outcome.result))
            .collect()
    };

    let mut exit_code = 0;
    for (job, result) in &results {
        match result.error() {
            Some(err) => {
                error!("{}: {}", job.input.display(), err);
                if exit_code == 0 {
                    exit_code = err.code();
                }
            }
            None if args.validate => info!("Validation passed: {}", job.input.display()),
            None => info!("Generated: {}", job.output.display()),
        }
    }

    if let Some(path) = &args.report {
        write_report(path, &results, args.validate)?;
        info!("Report: {}", path.display());
    }

    Ok(ExitCode::from(u8::try_from(exit_code).unwrap_or(1)))
}

fn init_logging(verbose: bool, level: Option<&str>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply command line flags on top of the settings file.
fn build_options(args: &Args, mut options: ConversionOptions) -> ConversionOptions {
    if args.strict {
        options.strictness = Strictness::Strict;
    }
    if let Some(unit) = args.unit {
        options.source_unit = Some(unit);
    }
    if let Some(datum) = &args.datum {
        options.default_datum = Some(datum.clone());
    }
    if let Some(unit) = args.to_unit {
        options.canonical.unit = unit;
    }
    if let Some(datum) = &args.to_datum {
        options.canonical.datum = datum.clone();
    }
    if args.json {
        options.output_format = OutputFormat::Json;
    }
    if let Some(precision) = args.precision {
        options.precision = precision;
    }
    options
}

fn build_jobs(args: &Args, options: &ConversionOptions) -> Result<Vec<BatchJob>> {
    if args.output.is_some() && args.input.len() > 1 {
        bail!("--output takes a single input; use --output-dir for several");
    }

    let extension = match options.output_format {
        OutputFormat::Text => "xs",
        OutputFormat::Json => "json",
    };

    let jobs = args
        .input
        .iter()
        .map(|input| -> Result<BatchJob> {
            let format = match args.format {
                Some(format) => format,
                None => InputFormat::from_extension(input).with_context(|| {
                    format!(
                        "Cannot detect the format of {}; pass --format",
                        input.display()
                    )
                })?,
            };

            let output = match (&args.output, &args.output_dir) {
                (Some(output), _) => output.clone(),
                (None, Some(dir)) => batch::output_path(input, dir, extension),
                (None, None) => {
                    let dir = input.parent().unwrap_or_else(|| Path::new("."));
                    batch::output_path(input, dir, extension)
                }
            };

            if !args.validate && output == *input {
                bail!(
                    "Output would overwrite the input {}; pass --output",
                    input.display()
                );
            }

            Ok(BatchJob::new(input, output, format))
        })
        .collect::<Result<Vec<_>>>()?;

    if !args.validate {
        check_collisions(&jobs)?;
    }
    Ok(jobs)
}

/// Refuse job lists where two outputs coincide or an output is another job's input.
fn check_collisions(jobs: &[BatchJob]) -> Result<()> {
    let inputs: HashSet<&Path> = jobs.iter().map(|job| job.input.as_path()).collect();
    let mut outputs: HashSet<&Path> = HashSet::new();

    for job in jobs {
        if !outputs.insert(job.output.as_path()) {
            bail!(
                "Several inputs would be written to {}; pass --output-dir or rename the inputs",
                job.output.display()
            );
        }
        if inputs.contains(job.output.as_path()) {
            bail!(
                "Output {} would overwrite an input file",
                job.output.display()
            );
        }
    }

    Ok(())
}

fn write_report(
    path: &Path,
    results: &[(&BatchJob, ConversionResult)],
    validate: bool,
) -> Result<()> {
    let entries: Vec<ReportEntry> = results
        .iter()
        .map(|(job, result)| ReportEntry {
            input: &job.input,
            output: (!validate && result.is_success()).then_some(job.output.as_path()),
            success: result.is_success(),
            code: result.exit_code(),
            error: result.error().map(|e| e.to_string()),
            diagnostics: &result.diagnostics,
        })
        .collect();

    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
