//! Shared numeric safeguards for the sensitivity estimators. All degenerate
//! cases funnel through here so every estimator maps them to the same
//! output: zero, never NaN or infinity.

/// Variance below this is treated as "no variance at all".
pub const VARIANCE_FLOOR: f64 = 1e-15;

/// Substitute for a zero base value before relative perturbation.
pub const ZERO_BASE_EPS: f64 = 1e-3;

#[inline]
pub fn guard_base(x: f64) -> f64 {
    if x == 0.0 {
        ZERO_BASE_EPS
    } else {
        x
    }
}

#[inline]
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

pub fn all_finite(xs: &[f64]) -> bool {
    xs.iter().all(|x| x.is_finite())
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample variance with the N-1 denominator.
pub fn sample_variance(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (xs.len() - 1) as f64
}

/// Sample standard deviation with the N-1 denominator.
pub fn sample_std(xs: &[f64], mean: f64) -> f64 {
    sample_variance(xs, mean).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards() {
        assert_eq!(guard_base(0.0), ZERO_BASE_EPS);
        assert_eq!(guard_base(2.5), 2.5);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(-1.5), -1.5);
    }

    #[test]
    fn variance_denominator() {
        let xs = [1.0, 2.0, 3.0];
        let m = mean(&xs);
        assert_eq!(m, 2.0);
        assert_eq!(sample_variance(&xs, m), 1.0);
        assert_eq!(sample_variance(&xs[..1], 1.0), 0.0);
    }
}
