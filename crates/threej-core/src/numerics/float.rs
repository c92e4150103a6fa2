//! Floating-point abstraction and the overflow-control thresholds of the 3j recurrence.
//!
//! The thresholds derive from the largest representable value of the float
//! type, exactly as `DRC3JJ` derives them from `D1MACH(2)`:
//! `HUGE = sqrt(max / 20)`, `SRHUGE = sqrt(HUGE)`, `TINY = 1 / HUGE`,
//! `SRTINY = 1 / SRHUGE`.

use std::sync::OnceLock;

use num_traits::Float;

/// Tolerance used for every integrality and range test on quantum numbers.
pub const EPS: f64 = 0.01;

/// Floating-point types accepted by the recurrence engine.
///
/// Implemented for `f64` and `f32`; quantum numbers and the output buffer share
/// the same type.
pub trait CouplingFloat:
    Float + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static
{
    /// Short type name used in logs and CLI output.
    const PRECISION: &'static str;

    /// Infallible conversion from f64 literals.
    fn from_f64(x: f64) -> Self;

    /// Process-wide thresholds, initialised once from [`Float::max_value`].
    fn scale_thresholds() -> &'static ScaleThresholds<Self>;
}

static F64_THRESHOLDS: OnceLock<ScaleThresholds<f64>> = OnceLock::new();
static F32_THRESHOLDS: OnceLock<ScaleThresholds<f32>> = OnceLock::new();

impl CouplingFloat for f64 {
    const PRECISION: &'static str = "f64";

    #[inline]
    fn from_f64(x: f64) -> f64 {
        x
    }

    fn scale_thresholds() -> &'static ScaleThresholds<f64> {
        F64_THRESHOLDS.get_or_init(|| ScaleThresholds::from_max_value(f64::MAX))
    }
}

impl CouplingFloat for f32 {
    const PRECISION: &'static str = "f32";

    #[inline]
    fn from_f64(x: f64) -> f32 {
        x as f32
    }

    fn scale_thresholds() -> &'static ScaleThresholds<f32> {
        F32_THRESHOLDS.get_or_init(|| ScaleThresholds::from_max_value(f32::MAX))
    }
}

/// Immutable scale constants threaded through every recursion routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleThresholds<T> {
    pub eps: T,
    pub huge: T,
    pub srhuge: T,
    pub tiny: T,
    pub srtiny: T,
}

impl<T: CouplingFloat> ScaleThresholds<T> {
    pub fn from_max_value(max_value: T) -> Self {
        let huge = (max_value / T::from_f64(20.0)).sqrt();
        let srhuge = huge.sqrt();
        Self {
            eps: T::from_f64(EPS),
            huge,
            srhuge,
            tiny: huge.recip(),
            srtiny: srhuge.recip(),
        }
    }

    pub fn for_precision() -> Self {
        *T::scale_thresholds()
    }
}

impl<T: CouplingFloat> Default for ScaleThresholds<T> {
    fn default() -> Self {
        Self::for_precision()
    }
}

/// `x - floor(x)`, i.e. the floored remainder of `x` modulo one.
#[inline]
pub(crate) fn floored_fract<T: CouplingFloat>(x: T) -> T {
    x - x.floor()
}

/// True when `(-1)^trunc(|x| + eps)` is negative.
#[inline]
pub(crate) fn parity_is_odd<T: CouplingFloat>(x: T, eps: T) -> bool {
    let count = (x.abs() + eps).floor();
    let two = T::from_f64(2.0);
    count - two * (count / two).floor() >= T::one()
}

/// `(-1)^trunc(|x| + eps)`.
#[inline]
pub(crate) fn parity_sign<T: CouplingFloat>(x: T, eps: T) -> T {
    if parity_is_odd(x, eps) {
        -T::one()
    } else {
        T::one()
    }
}

#[cfg(test)]
mod tests {
    use super::{CouplingFloat, ScaleThresholds, floored_fract, parity_is_odd, parity_sign};

    #[test]
    fn f64_thresholds_follow_max_value() {
        let scale = ScaleThresholds::<f64>::for_precision();
        let expected_huge = (f64::MAX / 20.0).sqrt();
        assert_eq!(scale.huge, expected_huge);
        assert_eq!(scale.srhuge, expected_huge.sqrt());
        assert_eq!(scale.tiny, 1.0 / expected_huge);
        assert_eq!(scale.srtiny, 1.0 / expected_huge.sqrt());
        assert_eq!(scale.eps, 0.01);
        assert!(scale.huge > 2.9e153 && scale.huge < 3.0e153);
    }

    #[test]
    fn process_wide_thresholds_are_shared() {
        let first = f64::scale_thresholds();
        let second = f64::scale_thresholds();
        assert!(std::ptr::eq(first, second));
        assert_eq!(*first, ScaleThresholds::default());
    }

    #[test]
    fn f32_thresholds_stay_representable() {
        let scale = ScaleThresholds::<f32>::for_precision();
        assert!(scale.huge.is_finite());
        assert!(scale.srhuge * scale.srhuge <= scale.huge * 1.0001);
        assert!(scale.tiny > 0.0);
        assert!(scale.srtiny > scale.tiny);
        assert!((scale.eps - 0.01).abs() < 1.0e-9);
    }

    #[test]
    fn alternate_max_value_produces_smaller_thresholds() {
        let scale = ScaleThresholds::<f64>::from_max_value(2.0e6);
        assert_eq!(scale.huge, 1.0e5f64.sqrt());
        assert!(scale.huge < ScaleThresholds::<f64>::for_precision().huge);
        assert_eq!(scale.srtiny, 1.0 / scale.srhuge);
    }

    #[test]
    fn floored_fract_matches_floored_modulo_for_negative_values() {
        assert!((floored_fract(2.25f64) - 0.25).abs() < 1.0e-15);
        assert!((floored_fract(-0.49f64) - 0.51).abs() < 1.0e-15);
        assert_eq!(floored_fract(-1.0f64), 0.0);
    }

    #[test]
    fn parity_truncates_after_adding_eps() {
        assert!(!parity_is_odd(0.0f64, 0.01));
        assert!(parity_is_odd(-1.0f64, 0.01));
        assert!(parity_is_odd(0.995f64, 0.01));
        assert!(!parity_is_odd(2.5f64, 0.01));
        assert!(parity_is_odd(3.5f64, 0.01));
        assert_eq!(parity_sign(3.0f64, 0.01), -1.0);
        assert_eq!(parity_sign(4.0f32, 0.01), 1.0);
    }
}
