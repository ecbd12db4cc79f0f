//! Descriptive statistics over path ensembles.

use std::cmp::Ordering;

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Annualized volatility of per-step returns.
///
/// # Arguments
/// * `returns` - Per-step simple returns
/// * `periods_per_year` - Steps in one year (252 for daily)
pub fn annualized_volatility(returns: &[f64], periods_per_year: f64) -> f64 {
    population_std(returns) * periods_per_year.sqrt()
}

/// Sorted copy; NaNs order as equal so they never panic the sort.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Percentile of already sorted data with linear interpolation.
///
/// # Arguments
/// * `sorted` - Ascending values
/// * `pct` - Percentile in [0, 100]
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Percentile of unsorted data.
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    percentile_sorted(&sorted(values), pct)
}

/// Median of unsorted data.
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}
