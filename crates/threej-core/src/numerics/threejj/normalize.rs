use crate::numerics::float::{CouplingFloat, ScaleThresholds, parity_is_odd};

/// Scales `values` to unit weighted norm and fixes the overall sign so the
/// last coefficient carries `(-1)^trunc(|phase| + eps)`.
///
/// `sum` is the weighted sum of squares of the unnormalized values. When the
/// normalization factor shrinks the values, entries that would underflow
/// are set to zero instead.
pub(crate) fn normalize<T: CouplingFloat>(
    values: &mut [T],
    sum: T,
    phase: T,
    scale: &ScaleThresholds<T>,
) {
    let mut cnorm = sum.sqrt().recip();
    let last_negative = values.last().is_some_and(|last| last.is_sign_negative());
    if last_negative != parity_is_odd(phase, scale.eps) {
        cnorm = -cnorm;
    }

    if cnorm.abs() < T::one() {
        let threshold = scale.tiny / cnorm.abs();
        for value in values.iter_mut() {
            *value = if value.abs() < threshold {
                T::zero()
            } else {
                cnorm * *value
            };
        }
    } else {
        for value in values.iter_mut() {
            *value = cnorm * *value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use crate::numerics::float::ScaleThresholds;

    #[test]
    fn normalization_applies_phase_to_last_entry() {
        let scale = ScaleThresholds::for_precision();
        let close = |lhs: [f64; 2], rhs: [f64; 2]| {
            lhs.iter().zip(rhs).all(|(a, b)| (a - b).abs() < 1.0e-15)
        };

        let mut values = [3.0f64, 4.0];
        normalize(&mut values, 25.0, 1.0, &scale);
        assert!(close(values, [-0.6, -0.8]), "{values:?}");

        let mut values = [3.0f64, -4.0];
        normalize(&mut values, 25.0, 2.0, &scale);
        assert!(close(values, [-0.6, 0.8]), "{values:?}");
    }

    #[test]
    fn shrinking_normalization_drops_underflowing_entries() {
        let scale = ScaleThresholds::<f64>::from_max_value(20.0e8);
        // tiny = 1e-4, cnorm = 0.1: entries below 1e-3 are dropped.
        let mut values = [5.0e-4f64, 2.0, 9.0];
        normalize(&mut values, 100.0, 0.0, &scale);
        assert_eq!(values[0], 0.0);
        assert!((values[1] - 0.2).abs() < 1.0e-15);
        assert!((values[2] - 0.9).abs() < 1.0e-15);
    }
}
