//! Fixture-driven regression of the 3j recurrence against stored reference vectors.

use crate::domain::{CouplingParameters, Diagnostic, ThreejError, ThreejjSequence};
use crate::numerics::{NumericTolerance, ThreejjSolver, format_report_value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const DEFAULT_UNITARITY_TOL: f64 = 1.0e-12;
const L1MIN_TOL: f64 = 1.0e-12;

#[derive(Debug, Clone)]
pub struct RegressionRunnerConfig {
    pub fixtures_path: PathBuf,
    pub report_path: PathBuf,
}

impl Default for RegressionRunnerConfig {
    fn default() -> Self {
        Self {
            fixtures_path: PathBuf::from("tasks/threejj-reference-fixtures.json"),
            report_path: PathBuf::from("artifacts/regression/threejj-report.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegressionReport {
    pub generated_at_unix_seconds: u64,
    pub passed: bool,
    pub fixtures_path: String,
    pub tolerance: NumericTolerance,
    pub case_count: usize,
    pub passed_case_count: usize,
    pub failed_case_count: usize,
    pub cases: Vec<CaseReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub case_id: String,
    pub passed: bool,
    pub plan: Option<String>,
    pub l1min: Option<f64>,
    pub length: Option<usize>,
    pub compared_value_count: usize,
    pub max_abs_diff: f64,
    pub unitarity_residual: Option<f64>,
    pub error_kind: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub tolerance: NumericTolerance,
    #[serde(default)]
    pub cases: Vec<FixtureCase>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCase {
    pub id: String,
    pub l2: f64,
    pub l3: f64,
    pub m2: f64,
    pub m3: f64,
    #[serde(default)]
    pub l1min: Option<f64>,
    #[serde(default)]
    pub length: Option<usize>,
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default)]
    pub tail_values: Vec<f64>,
    #[serde(default)]
    pub buffer_capacity: Option<usize>,
    #[serde(default)]
    pub expected_error: Option<String>,
    #[serde(default)]
    pub unitarity_tol: Option<f64>,
}

impl FixtureCase {
    fn params(&self) -> CouplingParameters<f64> {
        CouplingParameters::new(self.l2, self.l3, self.m2, self.m3)
    }
}

pub fn run_regression(config: &RegressionRunnerConfig) -> Result<RegressionReport, RegressionError> {
    let fixtures = load_fixtures(&config.fixtures_path)?;
    let solver = ThreejjSolver::<f64>::new();

    let cases: Vec<CaseReport> = fixtures
        .cases
        .iter()
        .map(|case| evaluate_case(&solver, case, fixtures.tolerance))
        .collect();

    let case_count = cases.len();
    let passed_case_count = cases.iter().filter(|case| case.passed).count();
    let failed_case_count = case_count.saturating_sub(passed_case_count);

    let report = RegressionReport {
        generated_at_unix_seconds: current_unix_timestamp_seconds(),
        passed: failed_case_count == 0,
        fixtures_path: normalize_path(&config.fixtures_path),
        tolerance: fixtures.tolerance,
        case_count,
        passed_case_count,
        failed_case_count,
        cases,
    };

    write_report_file(&config.report_path, &report)?;
    Ok(report)
}

pub fn render_human_summary(report: &RegressionReport) -> String {
    let mut lines = Vec::new();
    let status = if report.passed { "PASS" } else { "FAIL" };
    lines.push(format!("Regression status: {}", status));
    lines.push(format!(
        "Cases: {} total ({} passed, {} failed)",
        report.case_count, report.passed_case_count, report.failed_case_count
    ));

    for case in &report.cases {
        let case_status = if case.passed { "PASS" } else { "FAIL" };
        match (&case.error_kind, case.length) {
            (Some(kind), _) => {
                lines.push(format!("Case {}: {} (error={})", case.case_id, case_status, kind));
            }
            (None, Some(length)) => lines.push(format!(
                "Case {}: {} (plan={}, length={}, max_abs_diff={}, unitarity_residual={})",
                case.case_id,
                case_status,
                case.plan.as_deref().unwrap_or("-"),
                length,
                format_report_value(case.max_abs_diff),
                case.unitarity_residual
                    .map_or_else(|| "-".to_string(), format_report_value)
            )),
            (None, None) => lines.push(format!("Case {}: {}", case.case_id, case_status)),
        }

        if let Some(reason) = case.reason.as_deref().filter(|_| !case.passed) {
            lines.push(format!("  failure: {}", reason));
        }
    }

    lines.join("\n")
}

#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    #[error("failed to read fixtures '{}': {source}", path.display())]
    ReadFixtures {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse fixtures '{}': {source}", path.display())]
    ParseFixtures {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to create report directory '{}': {source}", path.display())]
    ReportDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize report '{}': {source}", path.display())]
    SerializeReport {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write report '{}': {source}", path.display())]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RegressionError {
    pub fn diagnostic(&self) -> Diagnostic {
        let message = self.to_string();
        match self {
            Self::ReadFixtures { .. } => Diagnostic::io_system("IO.REGRESSION_FIXTURES", message),
            Self::ParseFixtures { .. } => {
                Diagnostic::input_validation("INPUT.REGRESSION_FIXTURES", message)
            }
            Self::ReportDirectory { .. } | Self::WriteReport { .. } => {
                Diagnostic::io_system("IO.REGRESSION_FILESYSTEM", message)
            }
            Self::SerializeReport { .. } => Diagnostic::internal("SYS.REGRESSION_REPORT", message),
        }
    }
}

impl From<RegressionError> for Diagnostic {
    fn from(error: RegressionError) -> Self {
        error.diagnostic()
    }
}

pub fn load_fixtures(path: &Path) -> Result<FixtureFile, RegressionError> {
    let content = fs::read_to_string(path).map_err(|source| RegressionError::ReadFixtures {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RegressionError::ParseFixtures {
        path: path.to_path_buf(),
        source,
    })
}

fn evaluate_case(
    solver: &ThreejjSolver<f64>,
    case: &FixtureCase,
    tolerance: NumericTolerance,
) -> CaseReport {
    let mut report = CaseReport {
        case_id: case.id.clone(),
        passed: false,
        plan: None,
        l1min: None,
        length: None,
        compared_value_count: 0,
        max_abs_diff: 0.0,
        unitarity_residual: None,
        error_kind: None,
        reason: None,
    };

    let params = case.params();
    let outcome = compute_case(solver, &params, case.buffer_capacity);
    let failure = match (outcome, case.expected_error.as_deref()) {
        (Err(error), Some(expected)) => {
            report.error_kind = Some(error.kind().to_string());
            (error.kind() != expected)
                .then(|| format!("expected error {}, got {}: {}", expected, error.kind(), error))
        }
        (Err(error), None) => {
            report.error_kind = Some(error.kind().to_string());
            Some(format!("unexpected error {}: {}", error.kind(), error))
        }
        (Ok(_), Some(expected)) => Some(format!("expected error {}, computation succeeded", expected)),
        (Ok(computed), None) => {
            if let Ok(range) = solver.validate(&params) {
                report.plan = Some(solver.plan(&params, &range).as_str().to_string());
            }
            let mismatch = compare_sequence(&mut report, case, &computed.sequence, tolerance);
            if computed.trailing_slots_touched {
                Some(mismatch.map_or_else(
                    || "buffer slots past the sequence were written".to_string(),
                    |reason| format!("{reason}; buffer slots past the sequence were written"),
                ))
            } else {
                mismatch
            }
        }
    };

    report.passed = failure.is_none();
    report.reason = failure;
    debug!(
        case = %report.case_id,
        passed = report.passed,
        max_abs_diff = report.max_abs_diff,
        "evaluated regression case"
    );
    report
}

struct ComputedCase {
    sequence: ThreejjSequence<f64>,
    trailing_slots_touched: bool,
}

fn compute_case(
    solver: &ThreejjSolver<f64>,
    params: &CouplingParameters<f64>,
    buffer_capacity: Option<usize>,
) -> Result<ComputedCase, ThreejError> {
    let Some(capacity) = buffer_capacity else {
        return solver.compute(params).map(|sequence| ComputedCase {
            sequence,
            trailing_slots_touched: false,
        });
    };

    let mut buffer = vec![0.0; capacity];
    let (l1min, values) = solver.compute_into(params, &mut buffer)?;
    let len = values.len();
    let trailing_slots_touched = buffer[len..].iter().any(|slot| *slot != 0.0);
    buffer.truncate(len);
    Ok(ComputedCase {
        sequence: ThreejjSequence {
            l1min,
            values: buffer,
        },
        trailing_slots_touched,
    })
}

fn compare_sequence(
    report: &mut CaseReport,
    case: &FixtureCase,
    sequence: &ThreejjSequence<f64>,
    tolerance: NumericTolerance,
) -> Option<String> {
    report.l1min = Some(sequence.l1min);
    report.length = Some(sequence.len());

    let residual = (sequence.unitarity_sum() - 1.0).abs();
    report.unitarity_residual = Some(residual);

    let mut failures = Vec::new();
    if let Some(expected) = case.l1min {
        if (sequence.l1min - expected).abs() > L1MIN_TOL {
            failures.push(format!("l1min {} != expected {}", sequence.l1min, expected));
        }
    }
    if let Some(expected) = case.length {
        if sequence.len() != expected {
            failures.push(format!("length {} != expected {}", sequence.len(), expected));
        }
    }

    let values = &sequence.values;
    let tail_start = values.len().saturating_sub(case.tail_values.len());
    let head = case.values.iter().enumerate();
    let tail = case
        .tail_values
        .iter()
        .enumerate()
        .map(|(offset, expected)| (tail_start + offset, expected));

    for (index, expected) in head.chain(tail) {
        let Some(actual) = values.get(index).copied() else {
            failures.push(format!("missing value at index {}", index));
            break;
        };
        let comparison = tolerance.compare(*expected, actual);
        report.compared_value_count += 1;
        report.max_abs_diff = report.max_abs_diff.max(comparison.abs_diff);
        if !comparison.passes && failures.len() < 8 {
            failures.push(format!(
                "value[{}] expected {} got {} (abs_diff={})",
                index,
                format_report_value(*expected),
                format_report_value(actual),
                format_report_value(comparison.abs_diff)
            ));
        }
    }

    let unitarity_tol = case.unitarity_tol.unwrap_or(DEFAULT_UNITARITY_TOL);
    if residual.is_nan() || residual > unitarity_tol {
        failures.push(format!(
            "unitarity residual {} exceeds {}",
            format_report_value(residual),
            format_report_value(unitarity_tol)
        ));
    }

    (!failures.is_empty()).then(|| failures.join("; "))
}

fn write_report_file(report_path: &Path, report: &RegressionReport) -> Result<(), RegressionError> {
    if let Some(parent_dir) = report_path.parent() {
        fs::create_dir_all(parent_dir).map_err(|source| RegressionError::ReportDirectory {
            path: parent_dir.to_path_buf(),
            source,
        })?;
    }

    let report_json =
        serde_json::to_string_pretty(report).map_err(|source| RegressionError::SerializeReport {
            path: report_path.to_path_buf(),
            source,
        })?;
    fs::write(report_path, report_json).map_err(|source| RegressionError::WriteReport {
        path: report_path.to_path_buf(),
        source,
    })
}

fn current_unix_timestamp_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
