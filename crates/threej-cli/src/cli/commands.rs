use super::CliError;
use super::helpers::{ComputeOutput, parse_quantum_number, render_text};
use anyhow::Context;
use std::path::PathBuf;
use threej_core::modules::regression::{
    RegressionRunnerConfig, render_human_summary, run_regression,
};
use threej_core::{CouplingFloat, CouplingParameters, ThreejjSequence, ThreejjSolver};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum Precision {
    F64,
    F32,
}

#[derive(clap::Args)]
pub(super) struct ComputeArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Floating-point precision of the recurrence
    #[arg(long, value_enum, default_value_t = Precision::F64)]
    precision: Precision,

    /// Size of the caller buffer; defaults to the exact sequence length
    #[arg(long)]
    capacity: Option<usize>,

    /// Angular momentum l2 (e.g. 3, 2.5 or 5/2)
    #[arg(value_name = "L2", allow_hyphen_values = true, value_parser = parse_quantum_number)]
    l2: f64,

    /// Angular momentum l3
    #[arg(value_name = "L3", allow_hyphen_values = true, value_parser = parse_quantum_number)]
    l3: f64,

    /// Magnetic quantum number m2
    #[arg(value_name = "M2", allow_hyphen_values = true, value_parser = parse_quantum_number)]
    m2: f64,

    /// Magnetic quantum number m3
    #[arg(value_name = "M3", allow_hyphen_values = true, value_parser = parse_quantum_number)]
    m3: f64,
}

#[derive(clap::Args)]
pub(super) struct RegressionArgs {
    /// Reference fixture file
    #[arg(long, default_value = "tasks/threejj-reference-fixtures.json")]
    fixtures: PathBuf,

    /// JSON report output path
    #[arg(long, default_value = "artifacts/regression/threejj-report.json")]
    report: PathBuf,
}

impl RegressionArgs {
    fn into_config(self) -> RegressionRunnerConfig {
        RegressionRunnerConfig {
            fixtures_path: self.fixtures,
            report_path: self.report,
        }
    }
}

pub(super) fn run_compute_command(args: ComputeArgs) -> Result<i32, CliError> {
    let quantum_numbers = [args.l2, args.l3, args.m2, args.m3];
    let output = match args.precision {
        Precision::F64 => compute_sequence::<f64>(quantum_numbers, args.capacity)?,
        Precision::F32 => compute_sequence::<f32>(quantum_numbers, args.capacity)?,
    };

    match args.format {
        OutputFormat::Text => println!("{}", render_text(&output)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output)
                .context("failed to serialize 3j sequence as JSON")?;
            println!("{}", json);
        }
    }
    Ok(0)
}

fn compute_sequence<T: CouplingFloat>(
    quantum_numbers: [f64; 4],
    capacity: Option<usize>,
) -> Result<ComputeOutput, CliError> {
    let [l2, l3, m2, m3] = quantum_numbers.map(T::from_f64);
    let params = CouplingParameters::new(l2, l3, m2, m3);
    let solver = ThreejjSolver::<T>::new();

    let range = solver.validate(&params).map_err(CliError::Compute)?;
    let plan = solver.plan(&params, &range);
    let sequence = match capacity {
        Some(capacity) => {
            let mut buffer = vec![T::zero(); capacity];
            let (l1min, values) = solver
                .compute_into(&params, &mut buffer)
                .map_err(CliError::Compute)?;
            ThreejjSequence {
                l1min,
                values: values.to_vec(),
            }
        }
        None => solver.compute(&params).map_err(CliError::Compute)?,
    };

    info!(
        precision = T::PRECISION,
        plan = plan.as_str(),
        length = sequence.len(),
        "computed 3j sequence"
    );
    Ok(ComputeOutput::new(
        quantum_numbers,
        T::PRECISION,
        plan.as_str(),
        sequence.to_f64(),
    ))
}

pub(super) fn run_regression_command(args: RegressionArgs) -> Result<i32, CliError> {
    let config = args.into_config();
    let report = run_regression(&config).map_err(CliError::Regression)?;
    println!("{}", render_human_summary(&report));
    println!("JSON report: {}", config.report_path.display());

    if report.passed { Ok(0) } else { Ok(1) }
}
