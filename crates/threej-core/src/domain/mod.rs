pub mod errors;

pub use errors::{Diagnostic, ErrorCategory, ExitPlaceholder, ThreejError, ThreejResult};

use serde::Serialize;

use crate::numerics::float::CouplingFloat;
use crate::numerics::compensated_weighted_sum;

/// Fixed quantum numbers `(l2, l3, m2, m3)` of one 3j sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingParameters<T> {
    pub l2: T,
    pub l3: T,
    pub m2: T,
    pub m3: T,
}

impl<T: CouplingFloat> CouplingParameters<T> {
    pub fn new(l2: T, l3: T, m2: T, m3: T) -> Self {
        Self { l2, l3, m2, m3 }
    }

    pub fn m1(&self) -> T {
        -self.m2 - self.m3
    }

    pub fn has_zero_magnetic_numbers(&self) -> bool {
        self.m2 == T::zero() && self.m3 == T::zero()
    }

    /// Exponent of the phase carried by the last coefficient, `l2 + m2 - l3 + m3`.
    pub(crate) fn phase_exponent(&self) -> T {
        self.l2 + self.m2 - self.l3 + self.m3
    }
}

/// Validated l1 interval, `l1min ..= l1max` in unit steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientRange<T> {
    pub l1min: T,
    pub l1max: T,
    pub len: usize,
}

/// Owned result of the allocating entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreejjSequence<T> {
    pub l1min: T,
    pub values: Vec<T>,
}

impl<T: CouplingFloat> ThreejjSequence<T> {
    pub fn l1max(&self) -> T {
        self.l1min + T::from_f64(self.values.len().saturating_sub(1) as f64)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(l1, f(l1))` pairs in increasing l1.
    pub fn iter(&self) -> impl Iterator<Item = (T, T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (self.l1min + T::from_f64(index as f64), *value))
    }

    /// Coefficient for `l1`, or `None` off the l1 lattice.
    pub fn get(&self, l1: T) -> Option<T> {
        let eps = T::scale_thresholds().eps;
        let offset = l1 - self.l1min;
        if offset < -eps {
            return None;
        }
        let index = (offset + eps).floor();
        if (offset - index).abs() > eps {
            return None;
        }
        index.to_usize().and_then(|index| self.values.get(index).copied())
    }

    /// Sum of `(2 l1 + 1) f(l1)^2`; equals one for a normalized sequence.
    pub fn unitarity_sum(&self) -> f64 {
        unitarity_sum(self.l1min, &self.values)
    }

    pub fn to_f64(&self) -> ThreejjSequence<f64> {
        ThreejjSequence {
            l1min: self.l1min.to_f64().unwrap_or(f64::NAN),
            values: self
                .values
                .iter()
                .map(|value| value.to_f64().unwrap_or(f64::NAN))
                .collect(),
        }
    }
}

pub(crate) fn unitarity_sum<T: CouplingFloat>(l1min: T, values: &[T]) -> f64 {
    let l1min = l1min.to_f64().unwrap_or(f64::NAN);
    compensated_weighted_sum(values.iter().enumerate().map(|(index, value)| {
        let value = value.to_f64().unwrap_or(f64::NAN);
        (value * value, 2.0 * (l1min + index as f64) + 1.0)
    }))
}

#[cfg(test)]
mod tests {
    use super::{CouplingParameters, ThreejjSequence};

    #[test]
    fn m1_closes_the_magnetic_sum() {
        let params = CouplingParameters::new(5.0f64, 5.0, 3.0, -1.0);
        assert_eq!(params.m1(), -2.0);
        assert!(!params.has_zero_magnetic_numbers());
        assert!(CouplingParameters::new(5.0f64, 3.0, 0.0, 0.0).has_zero_magnetic_numbers());
    }

    #[test]
    fn sequence_lookup_respects_lattice() {
        let sequence = ThreejjSequence {
            l1min: 2.0f64,
            values: vec![-0.5, 0.0, 0.25],
        };
        assert_eq!(sequence.l1max(), 4.0);
        assert_eq!(sequence.get(2.0), Some(-0.5));
        assert_eq!(sequence.get(4.0), Some(0.25));
        assert_eq!(sequence.get(5.0), None);
        assert_eq!(sequence.get(1.0), None);
        assert_eq!(sequence.get(2.5), None);
        let pairs: Vec<(f64, f64)> = sequence.iter().collect();
        assert_eq!(pairs, vec![(2.0, -0.5), (3.0, 0.0), (4.0, 0.25)]);
    }

    #[test]
    fn single_precision_sequence_widens_exactly() {
        let sequence = ThreejjSequence {
            l1min: 0.5f32,
            values: vec![0.25, -0.125],
        };
        let widened = sequence.to_f64();
        assert_eq!(widened.l1min, 0.5);
        assert_eq!(widened.values, vec![0.25, -0.125]);
    }

    #[test]
    fn unitarity_sum_weights_by_multiplicity() {
        let sequence = ThreejjSequence {
            l1min: 0.0f64,
            values: vec![1.0, 0.0, 0.0],
        };
        assert_eq!(sequence.unitarity_sum(), 1.0);

        let triplet = ThreejjSequence {
            l1min: 1.0f64,
            values: vec![0.5, 0.0, 0.0],
        };
        assert!((triplet.unitarity_sum() - 0.75).abs() < 1.0e-15);
    }
}
