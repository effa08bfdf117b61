//! Rolling statistics
//!
//! Window-based indicators over a price column. Outputs are index-aligned with
//! the input: positions without a full trailing window are `None`.

use statrs::statistics::Statistics;

/// Calculate the trailing Simple Moving Average
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if period == 0 || i + 1 < period {
            result.push(None);
        } else {
            let sum: f64 = values[i + 1 - period..=i].iter().sum();
            result.push(Some(sum / period as f64));
        }
    }

    result
}

/// Calculate the trailing sample standard deviation (denominator `period - 1`)
///
/// A window of one observation has no sample deviation and yields `None`.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if period < 2 || i + 1 < period {
            result.push(None);
        } else {
            let std_dev = values[i + 1 - period..=i].iter().std_dev();
            result.push(Some(std_dev).filter(|s| !s.is_nan()));
        }
    }

    result
}

/// Standard deviation over mean. Undefined for a zero mean.
pub fn coefficient_of_variation(std_dev: Option<f64>, mean: Option<f64>) -> Option<f64> {
    match (std_dev, mean) {
        (Some(s), Some(m)) if m != 0.0 => Some(s / m).filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Quantile with linear interpolation between closest ranks
///
/// `q` is clamped to `[0, 1]`; NaN inputs are ignored. Returns `None` when no
/// finite value remains.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}
