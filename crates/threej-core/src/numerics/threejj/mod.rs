//! Wigner 3j coefficients for all allowed l1, with `(l2, l3, m2, m3)` fixed.
//!
//! ```text
//! f(l1) = ( l1      l2  l3 )
//!         ( -m2-m3  m2  m3 )      l1 = l1min, l1min + 1, ..., l1max
//! ```
//!
//! The sequence is produced by the three-term recurrence of Schulten & Gordon
//! (SLATEC `DRC3JJ`): a forward pass from l1min while it is stable, a backward
//! pass from l1max down to a three-point overlap, a least-squares match of the
//! two, and a final normalization to
//! `sum (2 l1 + 1) f(l1)^2 = 1` with `sign f(l1max) = (-1)^(l2 + m2 - l3 + m3)`.

mod degenerate;
mod matching;
mod normalize;
mod recursion;
mod validate;

use tracing::debug;

use crate::domain::{CoefficientRange, CouplingParameters, ThreejResult, ThreejjSequence};
use crate::numerics::float::{CouplingFloat, ScaleThresholds};

use degenerate::{single_coefficient, zero_magnetic};
use matching::match_and_normalize;
use normalize::normalize;
use recursion::{Direction, run_pass};
use validate::check_capacity;

/// Code path chosen once a parameter set has been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionPlan {
    /// `l1min == l1max`: one coefficient in closed form.
    Degenerate,
    /// `m2 == m3 == 0`: backward two-term recursion, odd terms vanish.
    ZeroMagnetic,
    /// Forward and backward three-term recursion, matched and normalized.
    General,
}

impl RecursionPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Degenerate => "degenerate",
            Self::ZeroMagnetic => "zero-magnetic",
            Self::General => "general",
        }
    }
}

/// Recurrence engine bound to one set of scale thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreejjSolver<T> {
    scale: ScaleThresholds<T>,
}

impl<T: CouplingFloat> Default for ThreejjSolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CouplingFloat> ThreejjSolver<T> {
    /// Solver using the process-wide thresholds of `T`.
    pub fn new() -> Self {
        Self::with_thresholds(ScaleThresholds::for_precision())
    }

    pub fn with_thresholds(scale: ScaleThresholds<T>) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> &ScaleThresholds<T> {
        &self.scale
    }

    pub fn validate(&self, params: &CouplingParameters<T>) -> ThreejResult<CoefficientRange<T>> {
        validate::validate(params, &self.scale)
    }

    pub fn plan(&self, params: &CouplingParameters<T>, range: &CoefficientRange<T>) -> RecursionPlan {
        if range.len == 1 {
            RecursionPlan::Degenerate
        } else if params.has_zero_magnetic_numbers() {
            RecursionPlan::ZeroMagnetic
        } else {
            RecursionPlan::General
        }
    }

    /// Fills the first `nfin` slots of `out` and returns `(l1min, &out[..nfin])`.
    ///
    /// All validation, including the capacity check, happens before the
    /// buffer is written. Slots past `nfin` are left untouched.
    pub fn compute_into<'a>(
        &self,
        params: &CouplingParameters<T>,
        out: &'a mut [T],
    ) -> ThreejResult<(T, &'a [T])> {
        let range = self.validate(params)?;
        check_capacity(&range, out.len())?;

        let values = &mut out[..range.len];
        self.fill(params, &range, values);
        Ok((range.l1min, &*values))
    }

    /// Allocates a buffer of exactly `nfin` slots and fills it.
    pub fn compute(&self, params: &CouplingParameters<T>) -> ThreejResult<ThreejjSequence<T>> {
        let range = self.validate(params)?;
        let mut values = vec![T::zero(); range.len];
        self.fill(params, &range, &mut values);
        Ok(ThreejjSequence {
            l1min: range.l1min,
            values,
        })
    }

    /// Runs the chosen plan over `values`, which holds exactly `range.len` slots.
    fn fill(&self, params: &CouplingParameters<T>, range: &CoefficientRange<T>, values: &mut [T]) {
        let plan = self.plan(params, range);
        debug!(
            plan = plan.as_str(),
            precision = T::PRECISION,
            l1min = %range.l1min,
            len = range.len,
            "computing 3j sequence"
        );

        values.fill(T::zero());
        match plan {
            RecursionPlan::Degenerate => {
                values[0] = single_coefficient(params, range, &self.scale);
            }
            RecursionPlan::ZeroMagnetic => {
                zero_magnetic(params, range, &self.scale, values);
            }
            RecursionPlan::General => {
                let forward = run_pass(
                    Direction::Forward,
                    params,
                    range,
                    &self.scale,
                    values,
                    range.len - 1,
                );
                if range.len == 2 {
                    normalize(values, forward.sum, params.phase_exponent(), &self.scale);
                } else {
                    match_and_normalize(params, range, &self.scale, values, &forward);
                }
            }
        }
    }

    /// Single symbol `(l1 l2 l3; m1 m2 m3)`.
    ///
    /// Zero when the magnetic numbers do not sum to zero or `l1` is not on
    /// the allowed lattice. Invalid `(l2, l3, m2, m3)` is still an error.
    pub fn symbol(&self, l1: T, m1: T, params: &CouplingParameters<T>) -> ThreejResult<T> {
        let range = self.validate(params)?;
        if (m1 - params.m1()).abs() > self.scale.eps {
            return Ok(T::zero());
        }
        let mut values = vec![T::zero(); range.len];
        self.fill(params, &range, &mut values);
        let sequence = ThreejjSequence {
            l1min: range.l1min,
            values,
        };
        Ok(sequence.get(l1).unwrap_or_else(T::zero))
    }
}

/// Allocating entry point with the process-wide thresholds.
pub fn threejj<T: CouplingFloat>(l2: T, l3: T, m2: T, m3: T) -> ThreejResult<ThreejjSequence<T>> {
    ThreejjSolver::new().compute(&CouplingParameters::new(l2, l3, m2, m3))
}

/// Caller-buffer entry point; `out` must hold at least `nfin` slots.
pub fn threejj_into<T: CouplingFloat>(
    l2: T,
    l3: T,
    m2: T,
    m3: T,
    out: &mut [T],
) -> ThreejResult<(T, &[T])> {
    ThreejjSolver::new().compute_into(&CouplingParameters::new(l2, l3, m2, m3), out)
}

pub fn wigner_3j<T: CouplingFloat>(l1: T, l2: T, l3: T, m1: T, m2: T, m3: T) -> ThreejResult<T> {
    ThreejjSolver::new().symbol(l1, m1, &CouplingParameters::new(l2, l3, m2, m3))
}

#[cfg(test)]
mod tests {
    use super::{RecursionPlan, ThreejjSolver, threejj, threejj_into, wigner_3j};
    use crate::domain::{CouplingParameters, ThreejError};

    fn assert_values(label: &str, actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{label}: length mismatch");
        for (index, (actual, expected)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (actual - expected).abs() < 1.0e-14,
                "{label}[{index}]: expected {expected}, got {actual}"
            );
        }
    }

    #[test]
    fn plan_follows_range_length_and_magnetic_numbers() {
        let solver = ThreejjSolver::<f64>::new();
        let cases = [
            ((0.0, 3.0, 0.0, 1.0), RecursionPlan::Degenerate),
            ((5.0, 3.0, 0.0, 0.0), RecursionPlan::ZeroMagnetic),
            ((10.0, 12.0, 3.0, -4.0), RecursionPlan::General),
            ((0.5, 0.5, 0.5, -0.5), RecursionPlan::General),
        ];
        for ((l2, l3, m2, m3), expected) in cases {
            let params = CouplingParameters::new(l2, l3, m2, m3);
            let range = solver.validate(&params).expect("valid parameters");
            assert_eq!(solver.plan(&params, &range), expected, "({l2}, {l3}, {m2}, {m3})");
        }
    }

    #[test]
    fn triplet_matches_reference() {
        let sequence = threejj(1.0f64, 1.0, 1.0, -1.0).expect("valid parameters");
        assert_eq!(sequence.l1min, 0.0);
        assert_values(
            "triplet",
            &sequence.values,
            &[0.5773502691896258, 0.4082482904638630, 0.1825741858350554],
        );
    }

    #[test]
    fn doublet_uses_forward_pass_only() {
        let sequence = threejj(0.5f64, 0.5, 0.5, -0.5).expect("valid parameters");
        assert_eq!(sequence.l1min, 0.0);
        assert_values("doublet", &sequence.values, &[0.7071067811865475, 0.4082482904638630]);
    }

    #[test]
    fn short_general_sequences_match_reference() {
        let sequence = threejj(3.0f64, 1.0, 1.0, -1.0).expect("valid parameters");
        assert_eq!(sequence.l1min, 2.0);
        assert_values(
            "(3, 1, 1, -1)",
            &sequence.values,
            &[0.23904572186687872, 0.2672612419124244, 0.1543033499620919],
        );

        let sequence = threejj(2.5f64, 1.5, 0.5, -0.5).expect("valid parameters");
        assert_eq!(sequence.l1min, 1.0);
        assert_values(
            "(5/2, 3/2, 1/2, -1/2)",
            &sequence.values,
            &[
                0.3162277660168379,
                0.11952286093343933,
                -0.1690308509457033,
                -0.21821789023599236,
            ],
        );
    }

    #[test]
    fn singlet_has_closed_form() {
        let sequence = threejj(0.0f64, 3.0, 0.0, 1.0).expect("valid parameters");
        assert_eq!(sequence.l1min, 3.0);
        assert_values("singlet", &sequence.values, &[0.3779644730092272]);
    }

    #[test]
    fn allocating_and_buffer_entry_points_agree_for_every_plan() {
        let solver = ThreejjSolver::<f64>::new();
        for (l2, l3, m2, m3) in [
            (0.0, 3.0, 0.0, 1.0),
            (5.0, 3.0, 0.0, 0.0),
            (0.5, 0.5, 0.5, -0.5),
            (10.0, 12.0, 3.0, -4.0),
        ] {
            let params = CouplingParameters::new(l2, l3, m2, m3);
            let sequence = solver.compute(&params).expect("valid parameters");
            let mut out = vec![f64::NAN; sequence.len()];
            let (l1min, values) = solver.compute_into(&params, &mut out).expect("valid parameters");
            assert_eq!(l1min, sequence.l1min, "({l2}, {l3}, {m2}, {m3})");
            assert_eq!(values, sequence.values.as_slice(), "({l2}, {l3}, {m2}, {m3})");
        }
    }

    #[test]
    fn caller_buffer_must_hold_full_range() {
        let mut out = [0.0f64; 1];
        assert_eq!(
            threejj_into(1.0, 1.0, 0.0, 0.0, &mut out),
            Err(ThreejError::BufferTooSmall {
                required: 3,
                available: 1
            })
        );
        assert_eq!(out, [0.0]);
    }

    #[test]
    fn oversized_buffer_keeps_trailing_slots() {
        let mut out = [7.0f64; 5];
        let (l1min, values) = threejj_into(1.0, 1.0, 1.0, -1.0, &mut out).expect("valid parameters");
        assert_eq!(l1min, 0.0);
        assert_eq!(values.len(), 3);
        assert_eq!(&out[3..], &[7.0, 7.0]);
    }

    #[test]
    fn invalid_magnetic_numbers_are_rejected_before_any_write() {
        let mut out = [9.0f64; 4];
        assert_eq!(
            threejj_into(0.0, 0.0, 1.0, 0.0, &mut out),
            Err(ThreejError::InvalidMagneticQuantumNumber)
        );
        assert_eq!(out, [9.0; 4]);
        assert_eq!(
            threejj(0.0f64, 0.0, 0.0, 1.0),
            Err(ThreejError::InvalidMagneticQuantumNumber)
        );
    }

    #[test]
    fn symbol_lookup_returns_zero_off_lattice() {
        let value = wigner_3j(1.0f64, 1.0, 1.0, 0.0, 1.0, -1.0).expect("valid parameters");
        assert!((value - 0.4082482904638630).abs() < 1.0e-14);

        // m1 + m2 + m3 != 0
        assert_eq!(wigner_3j(1.0f64, 1.0, 1.0, 1.0, 1.0, -1.0), Ok(0.0));
        // l1 beyond l1max and off the integer lattice
        assert_eq!(wigner_3j(3.0f64, 1.0, 1.0, 0.0, 1.0, -1.0), Ok(0.0));
        assert_eq!(wigner_3j(0.5f64, 1.0, 1.0, 0.0, 1.0, -1.0), Ok(0.0));
        // Invalid (l2, l3, m2, m3) still surfaces.
        assert_eq!(
            wigner_3j(0.0f64, 0.0, 0.0, -1.0, 1.0, 0.0),
            Err(ThreejError::InvalidMagneticQuantumNumber)
        );
    }
}
