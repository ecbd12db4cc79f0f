//! Closed-form approximation of a decision comparison.
//!
//! Portfolio drift and volatility come straight from per-asset figures under
//! a flat pairwise correlation, scaled by the square root of time. Tail
//! figures use fixed Gaussian multipliers instead of simulated percentiles.

use crate::analysis::comparator::{bounded_ratio, sharpe_ratio, Comparator};
use crate::core::config::EngineConfig;
use crate::core::types::{DecisionComparison, EnsembleStats};
use crate::core::universe::AssetUniverse;
use crate::execution::executor::ExecutionPlan;

/// One-sided 95% normal quantile.
pub const VAR_95_MULTIPLIER: f64 = 1.65;
/// One-sided 99% normal quantile.
pub const TAIL_LOSS_MULTIPLIER: f64 = 2.33;
/// Typical maximum drawdown in horizon standard deviations.
pub const DRAWDOWN_MULTIPLIER: f64 = 2.5;

/// Confidence reported for approximations.
pub const APPROXIMATION_CONFIDENCE: f64 = 0.4;

/// Closed-form substitute for the Monte Carlo comparison.
pub struct FastApproximator<'a> {
    universe: &'a dyn AssetUniverse,
    config: &'a EngineConfig,
}

impl<'a> FastApproximator<'a> {
    pub fn new(universe: &'a dyn AssetUniverse, config: &'a EngineConfig) -> Self {
        Self { universe, config }
    }

    /// Flat-correlation covariance of the given assets.
    fn covariance(&self, tickers: &[String]) -> Vec<Vec<f64>> {
        let vols: Vec<f64> = tickers
            .iter()
            .map(|t| self.universe.profile(t).volatility)
            .collect();
        let rho = self.config.base_correlation;
        (0..vols.len())
            .map(|i| {
                (0..vols.len())
                    .map(|j| {
                        let corr = if i == j { 1.0 } else { rho };
                        vols[i] * vols[j] * corr
                    })
                    .collect()
            })
            .collect()
    }

    /// Annual drift of a weight vector.
    pub fn annual_return(&self, tickers: &[String], weights: &[f64]) -> f64 {
        tickers
            .iter()
            .zip(weights)
            .map(|(t, w)| w * self.universe.profile(t).drift(self.config.risk_free_rate))
            .sum()
    }

    /// Annual variance of a weight vector (or of a weight difference).
    pub fn annual_variance(&self, tickers: &[String], weights: &[f64]) -> f64 {
        let cov = self.covariance(tickers);
        let mut var = 0.0;
        for (i, wi) in weights.iter().enumerate() {
            for (j, wj) in weights.iter().enumerate() {
                var += wi * wj * cov[i][j];
            }
        }
        var.max(0.0)
    }

    fn stats(&self, horizon_return: f64, horizon_variance: f64) -> EnsembleStats {
        let years = self.config.horizon_years();
        let horizon_sigma = horizon_variance.sqrt();
        let volatility = if years > 0.0 {
            horizon_sigma / years.sqrt()
        } else {
            0.0
        };
        EnsembleStats {
            expected_return_pct: horizon_return * 100.0,
            volatility_pct: volatility * 100.0,
            var_95_pct: (horizon_return - VAR_95_MULTIPLIER * horizon_sigma) * 100.0,
            median_drawdown_pct: (-DRAWDOWN_MULTIPLIER * horizon_sigma).max(-1.0) * 100.0,
            tail_loss_pct: (horizon_return - TAIL_LOSS_MULTIPLIER * horizon_sigma) * 100.0,
            sharpe_ratio: sharpe_ratio(
                horizon_return,
                volatility,
                self.config.risk_free_rate,
                years,
            ),
        }
    }

    /// Approximate comparison of an execution plan.
    ///
    /// The horizon is split at the execution step: the scenario holds the
    /// pre-decision weights before it and the post-decision weights (net of
    /// margin cost) after it.
    pub fn compare(&self, plan: &ExecutionPlan, shock_ratio: f64) -> DecisionComparison {
        let cfg = self.config;
        let years = cfg.horizon_years();
        let cutover = plan.execution_step.min(cfg.horizon_days);
        let pre_years = cutover as f64 / cfg.trading_days_per_year;
        let post_years = years - pre_years;

        let pre_return = self.annual_return(&plan.tickers, &plan.pre_weights);
        let pre_variance = self.annual_variance(&plan.tickers, &plan.pre_weights);
        let annual_margin = if plan.leverage.is_leveraged() {
            plan.leverage.daily_margin_cost * cfg.trading_days_per_year
        } else {
            0.0
        };
        let post_return = self.annual_return(&plan.tickers, &plan.post_weights) - annual_margin;
        let post_variance = self.annual_variance(&plan.tickers, &plan.post_weights);

        let baseline_return = pre_return * years;
        let scenario_return =
            (1.0 + pre_return * pre_years + post_return * post_years) * shock_ratio - 1.0;

        let baseline = self.stats(baseline_return, pre_variance * years);
        let scenario = self.stats(
            scenario_return,
            pre_variance * pre_years + post_variance * post_years,
        );

        let active: Vec<f64> = plan
            .post_weights
            .iter()
            .zip(&plan.pre_weights)
            .map(|(post, pre)| post - pre)
            .collect();
        let tracking_error = (self.annual_variance(&plan.tickers, &active) * post_years).sqrt();
        let information_ratio = bounded_ratio(
            scenario_return - baseline_return,
            tracking_error,
            cfg.information_ratio_bound,
        );

        Comparator::new(cfg).from_stats(baseline, scenario, information_ratio, 0)
    }
}
