//! Drawdown of value trajectories.
//!
//! Drawdowns are expressed as non-positive fractions: `value / running_peak - 1`.
//! The running peak starts at the value held before the first observation, so
//! a loss from the starting capital counts as drawdown.

/// Drawdown at every point of a value series.
///
/// # Arguments
/// * `start` - Value before the first observation (initial running peak)
/// * `values` - Portfolio values over time
///
/// # Returns
/// Drawdown fraction at each point (0 at a new peak, negative below it)
pub fn drawdown_curve(start: f64, values: &[f64]) -> Vec<f64> {
    let mut peak = start;
    values
        .iter()
        .map(|&v| {
            peak = peak.max(v);
            if peak > 0.0 {
                v / peak - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Maximum drawdown of a value series that started at `start`.
///
/// # Returns
/// Most negative drawdown fraction, 0 for a series that never falls below its peak
pub fn max_drawdown_from(start: f64, values: &[f64]) -> f64 {
    drawdown_curve(start, values).into_iter().fold(0.0, f64::min)
}
