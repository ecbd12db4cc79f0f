//! One simulated portfolio value trajectory.

use serde::{Deserialize, Serialize};

use crate::metrics::drawdown::max_drawdown_from;
use crate::metrics::stats::annualized_volatility;

/// A single Monte Carlo draw of portfolio value.
///
/// `values[t]` is the value after step `t`'s return, relative to a starting
/// value of 1 (times the shock ratio). Drawdown is measured from that starting
/// value. The derived fields are computed once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPath {
    values: Vec<f64>,
    terminal_return: f64,
    volatility: f64,
    max_drawdown: f64,
}

impl SimulationPath {
    /// Build a path from per-step returns.
    ///
    /// # Arguments
    /// * `returns` - Per-step portfolio returns in time order
    /// * `scale` - One-off multiplier applied to every value (macro shock ratio)
    /// * `periods_per_year` - Steps per year, for annualizing volatility
    pub fn from_returns(returns: &[f64], scale: f64, periods_per_year: f64) -> Self {
        let mut level = 1.0;
        let values: Vec<f64> = returns
            .iter()
            .map(|r| {
                level *= 1.0 + r;
                level * scale
            })
            .collect();
        let terminal_return = values.last().map_or(scale - 1.0, |v| v - 1.0);
        Self {
            terminal_return,
            volatility: annualized_volatility(returns, periods_per_year),
            max_drawdown: max_drawdown_from(scale, &values),
            values,
        }
    }

    /// Value trajectory.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Terminal value minus one.
    #[inline]
    pub fn terminal_return(&self) -> f64 {
        self.terminal_return
    }

    /// Annualized realized volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Maximum drawdown as a non-positive fraction.
    #[inline]
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_returns() {
        let path = SimulationPath::from_returns(&[0.1, -0.2, 0.05], 1.0, 252.0);
        let expected = [1.1, 0.88, 0.924];
        for (v, e) in path.values().iter().zip(expected) {
            assert!((v - e).abs() < 1e-12);
        }
        assert!((path.terminal_return() + 0.076).abs() < 1e-12);
        assert!((path.max_drawdown() + 0.2).abs() < 1e-12);
        assert!(path.volatility() > 0.0);
    }

    #[test]
    fn test_scale_shifts_terminal_only() {
        let plain = SimulationPath::from_returns(&[0.01, 0.02], 1.0, 252.0);
        let shocked = SimulationPath::from_returns(&[0.01, 0.02], 0.9, 252.0);
        let ratio = (1.0 + shocked.terminal_return()) / (1.0 + plain.terminal_return());
        assert!((ratio - 0.9).abs() < 1e-12);
        assert_eq!(plain.max_drawdown(), shocked.max_drawdown());
        assert_eq!(plain.volatility(), shocked.volatility());
    }

    #[test]
    fn test_first_step_loss_counts_as_drawdown() {
        let one_step = SimulationPath::from_returns(&[-0.10], 1.0, 252.0);
        assert!((one_step.max_drawdown() + 0.10).abs() < 1e-12);

        let declining = SimulationPath::from_returns(&[-0.10, -0.05], 1.0, 252.0);
        assert!((declining.terminal_return() + 0.145).abs() < 1e-12);
        assert!((declining.max_drawdown() + 0.145).abs() < 1e-12);
    }

    #[test]
    fn test_drawdown_measured_from_shocked_start() {
        let path = SimulationPath::from_returns(&[-0.10], 0.8, 252.0);
        assert!((path.max_drawdown() + 0.10).abs() < 1e-12);
    }
}
