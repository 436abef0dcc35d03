//! Numerically stable primitives for log-domain sequence math.

/// ln(2π), used by Gaussian normalizing constants.
pub const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Default additive floor applied before taking a logarithm of a probability.
pub const LOG_FLOOR: f64 = 1e-10;

/// `ln(Σ exp(v))` without overflow, shifted by the largest term.
///
/// Empty input and all `-inf` give `-inf`; any NaN gives NaN.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let peak = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !peak.is_finite() {
        return peak;
    }
    peak + values.iter().map(|v| (v - peak).exp()).sum::<f64>().ln()
}

/// `ln(p + floor)`.
///
/// The floor keeps zero probabilities finite in log space. It is additive, so
/// nonzero probabilities are shifted slightly as well.
#[inline]
pub fn ln_floor(p: f64, floor: f64) -> f64 {
    (p + floor).ln()
}

/// Index and value of the maximum, first occurrence wins on ties.
///
/// Returns `None` for an empty slice. NaN entries never win.
pub fn argmax_first(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            None if !v.is_nan() => best = Some((i, v)),
            Some((_, b)) if v > b => best = Some((i, v)),
            _ => {}
        }
    }
    best
}
