//! Shared numeric helpers.

/// Clamps `x` into `[lo, hi]`, mapping NaN to `lo`.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() {
        return lo;
    }
    x.max(lo).min(hi)
}

/// Clamps a score into `[0, 100]`.
pub fn clamp_score(x: f64) -> f64 {
    clamp(x, 0.0, 100.0)
}

/// Rounds half-way cases toward positive infinity.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Rounds to whole cents.
pub fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Gaussian bump centred on `mean` with width `spread`.
pub fn peak(x: f64, mean: f64, spread: f64) -> f64 {
    let z = (x - mean) / spread;
    (-(z * z)).exp()
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample variance (n - 1 denominator); zero for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    let Some(m) = mean(values) else {
        return 0.0;
    };
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Adds a signed delta to an unsigned counter, saturating at both ends.
pub fn apply_delta_u32(value: u32, delta: i64, max: u32) -> u32 {
    (value as i64 + delta).clamp(0, max as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_handles_nan() {
        assert_eq!(clamp(f64::NAN, 0.2, 0.4), 0.2);
        assert_eq!(clamp(1.0, 0.2, 0.4), 0.4);
        assert_eq!(clamp_score(-3.0), 0.0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
    }

    #[test]
    fn test_variance() {
        assert_eq!(sample_variance(&[]), 0.0);
        assert_eq!(sample_variance(&[4.0]), 0.0);
        assert!((sample_variance(&[2.0, 4.0, 6.0]) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_peak_is_one_at_mean() {
        assert_eq!(peak(10.0, 10.0, 6.0), 1.0);
        assert!(peak(40.0, 10.0, 6.0) < 1e-6);
    }

    #[test]
    fn test_apply_delta_u32() {
        assert_eq!(apply_delta_u32(3, -10, 5000), 0);
        assert_eq!(apply_delta_u32(4990, 30, 5000), 5000);
        assert_eq!(apply_delta_u32(10, 5, 5000), 15);
    }
}
