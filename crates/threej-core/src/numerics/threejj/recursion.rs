//! Three-term recurrence of Schulten & Gordon, run from either end of the l1 range.
//!
//! Both passes evaluate the same relation centred on `c`:
//!
//! ```text
//! c A(c+1) f(c+1) + B(c) f(c) + (c+1) A(c) f(c-1) = 0
//! A(L) = sqrt[(L+l2+l3+1)(L-l2+l3)(L+l2-l3)(-L+l2+l3+1)(L+m1)(L-m1)]
//! B(c) = -(2c+1) [m1 (l3(l3+1) - l2(l2+1)) + c(c+1)(m3-m2)]
//! ```
//!
//! The forward pass solves it for `f(c+1)`, the backward pass for `f(c-1)`.

use std::ops::Range;

use tracing::trace;

use crate::domain::{CoefficientRange, CouplingParameters};
use crate::numerics::float::{CouplingFloat, ScaleThresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// From l1min upward; stops once `|c1|` starts to grow.
    Forward,
    /// From l1max downward for a fixed number of steps.
    Backward,
}

impl Direction {
    /// Buffer slot of the coefficient produced at `step` (step 0 is the seed).
    #[inline]
    fn slot(self, len: usize, step: usize) -> usize {
        match self {
            Self::Forward => step,
            Self::Backward => len - 1 - step,
        }
    }

    /// Slots produced so far, i.e. the ones a rescale has to touch.
    #[inline]
    fn produced(self, len: usize, step: usize) -> Range<usize> {
        match self {
            Self::Forward => 0..step + 1,
            Self::Backward => len - 1 - step..len,
        }
    }
}

/// Outcome of one pass over the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PassOutcome<T> {
    /// Step at which the pass stopped.
    pub(crate) last_step: usize,
    /// Weighted sum of squares of every stored coefficient.
    pub(crate) sum: T,
    /// `sum` without the last stored coefficient.
    pub(crate) sum_before_last: T,
    /// Backward only: the coefficient computed at `last_step`, which
    /// overlaps the forward prefix and is therefore not stored.
    pub(crate) overlap: Option<T>,
    pub(crate) rescales: u32,
}

/// Per-pass state: current l1, the last `A` factor and `c1`, and the running sums.
struct RecursionState<T> {
    direction: Direction,
    l1: T,
    newfac: T,
    c1: T,
    sum: T,
    sum_before_last: T,
    step: usize,
    rescales: u32,
}

impl<T: CouplingFloat> RecursionState<T> {
    fn seed(
        direction: Direction,
        range: &CoefficientRange<T>,
        scale: &ScaleThresholds<T>,
        values: &mut [T],
    ) -> Self {
        let l1 = match direction {
            Direction::Forward => range.l1min,
            Direction::Backward => range.l1max,
        };
        values[direction.slot(values.len(), 0)] = scale.srtiny;
        let sum = (l1 + l1 + T::one()) * scale.tiny;
        Self {
            direction,
            l1,
            newfac: T::zero(),
            c1: T::zero(),
            sum,
            sum_before_last: sum,
            step: 0,
            rescales: 0,
        }
    }

    fn accumulate(&mut self, value: T) {
        let weight = self.l1 + self.l1 + T::one();
        self.sum_before_last = self.sum;
        self.sum = self.sum + weight * (value * value);
    }

    fn outcome(&self, overlap: Option<T>) -> PassOutcome<T> {
        PassOutcome {
            last_step: self.step,
            sum: self.sum,
            sum_before_last: self.sum_before_last,
            overlap,
            rescales: self.rescales,
        }
    }
}

/// Runs one recursion pass over `values` (exactly `range.len` slots).
///
/// The forward pass stops at `last_step` or as soon as `|c1|` stops
/// decreasing. The backward pass always runs to `last_step` and hands the
/// value computed there back through [`PassOutcome::overlap`].
pub(crate) fn run_pass<T: CouplingFloat>(
    direction: Direction,
    params: &CouplingParameters<T>,
    range: &CoefficientRange<T>,
    scale: &ScaleThresholds<T>,
    values: &mut [T],
    last_step: usize,
) -> PassOutcome<T> {
    debug_assert!(last_step >= 1 && last_step < values.len());

    let len = values.len();
    let one = T::one();
    let CouplingParameters { l2, l3, m2, m3 } = *params;
    let m1 = params.m1();
    let stride = match direction {
        Direction::Forward => one,
        Direction::Backward => -one,
    };

    let mut state = RecursionState::seed(direction, range, scale, values);

    loop {
        state.step += 1;
        state.l1 = state.l1 + stride;
        let l1 = state.l1;
        let step = state.step;
        let center = l1 - stride;
        let c1old = state.c1.abs();
        let oldfac = state.newfac;

        let (factor_at, near, far) = match direction {
            Direction::Forward => (l1, center, l1),
            Direction::Backward => (center, center + one, center),
        };
        state.newfac = coupling_factor(l2, l3, m1, factor_at);

        let dv = -l2 * (l2 + one) * m1
            + l3 * (l3 + one) * m1
            + center * (center + one) * (m3 - m2);
        let denom = near * state.newfac;

        state.c1 = if direction == Direction::Forward && l1 < one + scale.eps {
            // l1 = 1: the (l1 - 1) factor cancels between dv and denom.
            -(l1 + l1 - one) * l1 * (m3 - m2) / state.newfac
        } else {
            -(center + center + one) * dv / denom
        };

        if step == 1 {
            // Only one predecessor exists; the c2 term vanishes.
            let x = scale.srtiny * state.c1;
            values[direction.slot(len, step)] = x;
            state.accumulate(x);
            if step == last_step {
                break;
            }
            continue;
        }

        let c2 = -far * oldfac / denom;
        let x = state.c1 * values[direction.slot(len, step - 1)]
            + c2 * values[direction.slot(len, step - 2)];

        if direction == Direction::Backward && step == last_step {
            return state.outcome(Some(x));
        }

        values[direction.slot(len, step)] = x;
        state.accumulate(x);
        if step == last_step {
            break;
        }

        if x.abs() > scale.srhuge {
            rescale(&mut values[direction.produced(len, step)], scale);
            state.sum_before_last = state.sum_before_last / scale.huge;
            state.sum = state.sum / scale.huge;
            state.rescales += 1;
            trace!(?direction, step, "rescaled partial 3j sequence");
        }

        // Growing |c1| means the recursion now runs towards decreasing values.
        if direction == Direction::Forward && state.c1.abs() >= c1old {
            break;
        }
    }

    trace!(
        ?direction,
        last_step = state.step,
        rescales = state.rescales,
        "recursion pass finished"
    );
    state.outcome(None)
}

/// Triangle product `(L+l2+l3+1)(L-l2+l3)(L+l2-l3)(-L+l2+l3+1)`.
#[inline]
pub(crate) fn triangle_product<T: CouplingFloat>(l2: T, l3: T, l: T) -> T {
    let one = T::one();
    (l + l2 + l3 + one) * (l - l2 + l3) * (l + l2 - l3) * (-l + l2 + l3 + one)
}

/// `A(L)`: vanishes exactly at the edges of the allowed l1 range.
#[inline]
pub(crate) fn coupling_factor<T: CouplingFloat>(l2: T, l3: T, m1: T, l: T) -> T {
    let magnetic = (l + m1) * (l - m1);
    (triangle_product(l2, l3, l) * magnetic).sqrt()
}

/// Divides every produced coefficient by `SRHUGE`, dropping those below `SRTINY`.
pub(crate) fn rescale<T: CouplingFloat>(values: &mut [T], scale: &ScaleThresholds<T>) {
    for value in values.iter_mut() {
        if value.abs() < scale.srtiny {
            *value = T::zero();
        } else {
            *value = *value / scale.srhuge;
        }
    }
}
