//! Cases that bypass the two-sided recurrence.

use tracing::trace;

use crate::domain::{CoefficientRange, CouplingParameters};
use crate::numerics::float::{CouplingFloat, ScaleThresholds, parity_sign};

use super::normalize::normalize;
use super::recursion::{rescale, triangle_product};

/// `l1min == l1max`: the single coefficient has a closed form.
pub(crate) fn single_coefficient<T: CouplingFloat>(
    params: &CouplingParameters<T>,
    range: &CoefficientRange<T>,
    scale: &ScaleThresholds<T>,
) -> T {
    let sign = parity_sign(params.phase_exponent(), scale.eps);
    sign / (range.l1min + params.l2 + params.l3 + T::one()).sqrt()
}

/// `m2 == m3 == 0`: every coefficient with odd `l1 + l2 + l3` vanishes and the
/// recurrence collapses to a two-term relation stepping down by two from l1max.
///
/// Returns the number of overflow rescales applied on the way down.
pub(crate) fn zero_magnetic<T: CouplingFloat>(
    params: &CouplingParameters<T>,
    range: &CoefficientRange<T>,
    scale: &ScaleThresholds<T>,
    values: &mut [T],
) -> u32 {
    let len = values.len();
    let (l2, l3) = (params.l2, params.l3);
    let one = T::one();
    let two = T::from_f64(2.0);

    values[len - 1] = scale.srtiny;
    let mut sum = scale.tiny * (range.l1max + range.l1max + one);
    let mut target = range.l1max;
    let mut rescales = 0u32;

    for k in (2..len).step_by(2) {
        target = target - two;
        let oldfac = triangle_product(l2, l3, target + two).sqrt();
        let newfac = triangle_product(l2, l3, target + one).sqrt();
        let y = -(oldfac / newfac) * values[len + 1 - k];

        values[len - k] = T::zero();
        values[len - 1 - k] = y;
        sum = sum + (target + target + one) * (y * y);

        if y.abs() > scale.srhuge {
            rescale(&mut values[len - 1 - k..], scale);
            sum = sum / scale.huge;
            rescales += 1;
        }
    }

    trace!(rescales, "zero-magnetic recurrence finished");
    normalize(values, sum, l2 - l3, scale);
    rescales
}
