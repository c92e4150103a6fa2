pub mod float;
pub mod threejj;

pub use float::{CouplingFloat, EPS, ScaleThresholds};
pub use threejj::{RecursionPlan, ThreejjSolver, threejj, threejj_into, wigner_3j};

use serde::{Deserialize, Serialize};

/// Acceptance window for comparing computed coefficients against reference values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericTolerance {
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Lower bound on the magnitude used as relative scale, so that
    /// reference zeros are judged on `abs_tol` alone.
    pub relative_floor: f64,
}

impl Default for NumericTolerance {
    fn default() -> Self {
        Self {
            abs_tol: 1.0e-14,
            rel_tol: 1.0e-12,
            relative_floor: 1.0e-12,
        }
    }
}

impl NumericTolerance {
    pub fn compare(&self, expected: f64, actual: f64) -> ValueComparison {
        let abs_diff = (actual - expected).abs();
        let scale = expected.abs().max(self.relative_floor);
        ValueComparison {
            abs_diff,
            rel_diff: abs_diff / scale,
            passes: abs_diff <= self.abs_tol || abs_diff <= self.rel_tol * scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueComparison {
    pub abs_diff: f64,
    pub rel_diff: f64,
    pub passes: bool,
}

/// Scientific notation with 15 fractional digits; non-finite values print as
/// `NaN`, `inf` or `-inf`.
pub fn format_report_value(value: f64) -> String {
    match value {
        value if value.is_nan() => "NaN".to_string(),
        f64::INFINITY => "inf".to_string(),
        f64::NEG_INFINITY => "-inf".to_string(),
        value => format!("{value:.15E}"),
    }
}

/// Kahan-compensated `sum weight * value` over `(value, weight)` pairs.
pub fn compensated_weighted_sum(terms: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;
    for (value, weight) in terms {
        let term = value * weight - correction;
        let next = sum + term;
        correction = (next - sum) - term;
        sum = next;
    }
    sum
}
