//! Input constraints of the 3j recurrence and the resulting l1 range.

use crate::domain::{CoefficientRange, CouplingParameters, ThreejError, ThreejResult};
use crate::numerics::float::{CouplingFloat, ScaleThresholds, floored_fract};

/// Checks the restrictions of `DRC3JJ` in order and returns the l1 range.
///
/// 1. `l2 >= |m2|` and `l3 >= |m3|`
/// 2. `l2 + |m2|` and `l3 + |m3|` integral
/// 3. `l1max - l1min` integral
/// 4. `l1max >= l1min`
///
/// Conventional half-integer restrictions are not enforced beyond these.
pub(crate) fn validate<T: CouplingFloat>(
    params: &CouplingParameters<T>,
    scale: &ScaleThresholds<T>,
) -> ThreejResult<CoefficientRange<T>> {
    let eps = scale.eps;
    let CouplingParameters { l2, l3, m2, m3 } = *params;

    if l2 - m2.abs() + eps < T::zero() || l3 - m3.abs() + eps < T::zero() {
        return Err(ThreejError::InvalidMagneticQuantumNumber);
    }

    if !near_integer(l2 + m2.abs(), eps) || !near_integer(l3 + m3.abs(), eps) {
        return Err(ThreejError::NonIntegerSum);
    }

    let l1min = (l2 - l3).abs().max(params.m1().abs());
    let l1max = l2 + l3;

    if !near_integer(l1max - l1min, eps) {
        return Err(ThreejError::NonIntegerRange);
    }

    if l1min >= l1max + eps {
        return Err(ThreejError::InvertedRange);
    }

    let len = (l1max - l1min + T::one() + eps)
        .floor()
        .to_usize()
        .filter(|len| *len > 0)
        .ok_or(ThreejError::InvertedRange)?;

    Ok(CoefficientRange { l1min, l1max, len })
}

pub(crate) fn check_capacity<T>(range: &CoefficientRange<T>, available: usize) -> ThreejResult<()> {
    if available < range.len {
        return Err(ThreejError::BufferTooSmall {
            required: range.len,
            available,
        });
    }
    Ok(())
}

#[inline]
fn near_integer<T: CouplingFloat>(value: T, eps: T) -> bool {
    floored_fract(value + eps) < eps + eps
}
