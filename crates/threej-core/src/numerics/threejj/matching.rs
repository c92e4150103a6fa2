//! Joins the forward prefix and the backward suffix of a general sequence.

use tracing::{debug, trace};

use crate::domain::{CoefficientRange, CouplingParameters};
use crate::numerics::float::{CouplingFloat, ScaleThresholds};

use super::normalize::normalize;
use super::recursion::{Direction, PassOutcome, run_pass};

/// Runs the backward pass down to the three-point overlap left by the forward
/// pass, rescales one side onto the other by least squares, and normalizes.
pub(crate) fn match_and_normalize<T: CouplingFloat>(
    params: &CouplingParameters<T>,
    range: &CoefficientRange<T>,
    scale: &ScaleThresholds<T>,
    values: &mut [T],
    forward: &PassOutcome<T>,
) {
    let len = values.len();
    let stop = forward.last_step;
    let x = [values[stop], values[stop - 1], values[stop - 2]];

    // Backward covers slots len-1 down to stop-1; the value for stop-2 comes back as overlap.
    let backward_steps = len - stop + 2;
    let backward = run_pass(
        Direction::Backward,
        params,
        range,
        scale,
        values,
        backward_steps - 1,
    );
    let overlap = backward.overlap.unwrap_or_else(T::zero);
    let y = [values[stop], values[stop - 1], overlap];

    let sxy = x[0] * y[0] + x[1] * y[1] + x[2] * y[2];
    let sxx = x[0] * x[0] + x[1] * x[1] + x[2] * x[2];
    let ratio = sxy / sxx;
    let nlim = stop - 1;

    let sum = if ratio.abs() >= T::one() {
        for value in &mut values[..nlim] {
            *value = ratio * *value;
        }
        ratio * ratio * forward.sum_before_last + backward.sum_before_last
    } else {
        let inverse = ratio.recip();
        for value in &mut values[nlim..] {
            *value = inverse * *value;
        }
        forward.sum_before_last + inverse * inverse * backward.sum_before_last
    };

    trace!(stop, backward_steps, %ratio, "matched forward and backward passes");
    debug!(
        forward_rescales = forward.rescales,
        backward_rescales = backward.rescales,
        "general 3j sequence assembled"
    );

    normalize(values, sum, params.phase_exponent(), scale);
}
