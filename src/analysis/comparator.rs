//! Reduction of paired path ensembles to point statistics and deltas.

use crate::core::config::EngineConfig;
use crate::core::error::{CounterfactError, Result};
use crate::core::types::{DecisionComparison, EnsembleStats};
use crate::metrics::stats::{mean, median, percentile_sorted, population_std, sorted};
use crate::portfolio::path::SimulationPath;
use crate::portfolio::valuator::PathEnsemble;

/// Sharpe ratio over a horizon.
///
/// # Arguments
/// * `expected_return` - Mean horizon return (fraction)
/// * `volatility` - Annualized volatility (fraction)
/// * `risk_free_rate` - Annual risk-free rate
/// * `horizon_years` - Horizon length in years
pub fn sharpe_ratio(
    expected_return: f64,
    volatility: f64,
    risk_free_rate: f64,
    horizon_years: f64,
) -> f64 {
    let scaled_vol = volatility * horizon_years.sqrt();
    if scaled_vol < 1e-12 {
        return 0.0;
    }
    (expected_return - risk_free_rate * horizon_years) / scaled_vol
}

/// `delta / dispersion` clamped to `[-bound, bound]`.
///
/// A vanishing dispersion gives 0 for a vanishing delta and the bound
/// (with the delta's sign) otherwise.
pub fn bounded_ratio(delta: f64, dispersion: f64, bound: f64) -> f64 {
    let ratio = if dispersion < 1e-12 {
        if delta.abs() < 1e-12 {
            0.0
        } else {
            delta.signum() * bound
        }
    } else {
        delta / dispersion
    };
    ratio.clamp(-bound, bound)
}

/// Mean paired difference over its dispersion, clamped to `[-bound, bound]`.
pub fn information_ratio(paired_differences: &[f64], bound: f64) -> f64 {
    bounded_ratio(
        mean(paired_differences),
        population_std(paired_differences),
        bound,
    )
}

/// Compares baseline and scenario ensembles.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    risk_free_rate: f64,
    horizon_years: f64,
    horizon_days: usize,
    information_ratio_bound: f64,
}

impl Comparator {
    /// Create a comparator from the engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            risk_free_rate: config.risk_free_rate,
            horizon_years: config.horizon_years(),
            horizon_days: config.horizon_days,
            information_ratio_bound: config.information_ratio_bound,
        }
    }

    /// Statistics of one ensemble.
    pub fn ensemble_stats(&self, paths: &[SimulationPath]) -> EnsembleStats {
        let returns: Vec<f64> = paths.iter().map(|p| p.terminal_return()).collect();
        let vols: Vec<f64> = paths.iter().map(|p| p.volatility()).collect();
        let drawdowns: Vec<f64> = paths.iter().map(|p| p.max_drawdown()).collect();
        let sorted_returns = sorted(&returns);

        let expected_return = mean(&returns);
        let volatility = mean(&vols);

        EnsembleStats {
            expected_return_pct: expected_return * 100.0,
            volatility_pct: volatility * 100.0,
            var_95_pct: percentile_sorted(&sorted_returns, 5.0) * 100.0,
            median_drawdown_pct: median(&drawdowns) * 100.0,
            tail_loss_pct: percentile_sorted(&sorted_returns, 1.0) * 100.0,
            sharpe_ratio: sharpe_ratio(
                expected_return,
                volatility,
                self.risk_free_rate,
                self.horizon_years,
            ),
        }
    }

    /// Assemble a comparison from precomputed statistics.
    pub fn from_stats(
        &self,
        baseline: EnsembleStats,
        scenario: EnsembleStats,
        information_ratio: f64,
        n_paths: usize,
    ) -> DecisionComparison {
        DecisionComparison {
            delta_return_pct: scenario.expected_return_pct - baseline.expected_return_pct,
            delta_volatility_pct: scenario.volatility_pct - baseline.volatility_pct,
            delta_var_95_pct: scenario.var_95_pct - baseline.var_95_pct,
            delta_drawdown_pct: scenario.median_drawdown_pct - baseline.median_drawdown_pct,
            delta_tail_loss_pct: scenario.tail_loss_pct - baseline.tail_loss_pct,
            information_ratio: information_ratio
                .clamp(-self.information_ratio_bound, self.information_ratio_bound),
            baseline,
            scenario,
            n_paths,
            horizon_days: self.horizon_days,
        }
    }

    /// Compare a paired ensemble.
    pub fn compare(&self, ensemble: &PathEnsemble) -> Result<DecisionComparison> {
        if ensemble.baseline.len() != ensemble.scenario.len() {
            return Err(CounterfactError::length_mismatch(
                ensemble.baseline.len(),
                ensemble.scenario.len(),
            ));
        }
        if ensemble.is_empty() {
            return Err(CounterfactError::empty_data("comparison (no paths)"));
        }

        let differences: Vec<f64> = ensemble
            .baseline
            .iter()
            .zip(&ensemble.scenario)
            .map(|(b, s)| s.terminal_return() - b.terminal_return())
            .collect();

        Ok(self.from_stats(
            self.ensemble_stats(&ensemble.baseline),
            self.ensemble_stats(&ensemble.scenario),
            information_ratio(&differences, self.information_ratio_bound),
            ensemble.len(),
        ))
    }
}
