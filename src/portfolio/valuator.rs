//! Vectorized baseline/scenario valuation.
//!
//! Both portfolios are valued from the same price tensor with a single
//! matrix product: the `(paths * steps) x assets` step-return matrix times an
//! `assets x 2` matrix holding the pre- and post-decision weights. Weights
//! are constant-mix: they are restored to target at every step instead of
//! drifting with prices.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::core::error::{CounterfactError, Result};
use crate::execution::executor::ExecutionPlan;
use crate::market::paths::PriceTensor;
use crate::portfolio::path::SimulationPath;

/// Weights and cutover for one valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationInput {
    /// Weights held for the whole baseline horizon.
    pub pre_weights: Vec<f64>,
    /// Scenario weights from `execution_step` onward.
    pub post_weights: Vec<f64>,
    /// First step using post-decision weights.
    pub execution_step: usize,
    /// Margin cost deducted from each post-execution scenario return.
    pub daily_margin_cost: f64,
    /// One-off value ratio applied to the scenario (1 = no shock).
    pub shock_ratio: f64,
}

impl ValuationInput {
    /// Build the valuation input of an execution plan.
    pub fn from_plan(plan: &ExecutionPlan, shock_ratio: f64) -> Self {
        Self {
            pre_weights: plan.pre_weights.clone(),
            post_weights: plan.post_weights.clone(),
            execution_step: plan.execution_step,
            daily_margin_cost: if plan.leverage.is_leveraged() {
                plan.leverage.daily_margin_cost
            } else {
                0.0
            },
            shock_ratio,
        }
    }
}

/// Paired `paths x steps` portfolio return matrices.
#[derive(Debug, Clone)]
pub struct ReturnMatrices {
    pub baseline: DMatrix<f64>,
    pub scenario: DMatrix<f64>,
}

/// Baseline and scenario paths; index `i` in both shares the same draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEnsemble {
    pub baseline: Vec<SimulationPath>,
    pub scenario: Vec<SimulationPath>,
}

impl PathEnsemble {
    /// Number of paths per side.
    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }
}

/// Values portfolios over simulated prices.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioValuator {
    periods_per_year: f64,
}

impl PortfolioValuator {
    /// Create a valuator for steps of `1 / periods_per_year` years.
    pub fn new(periods_per_year: f64) -> Self {
        Self { periods_per_year }
    }

    /// Baseline and scenario return matrices.
    pub fn return_matrices(
        &self,
        tensor: &PriceTensor,
        input: &ValuationInput,
    ) -> Result<ReturnMatrices> {
        let n_assets = tensor.n_assets();
        if input.pre_weights.len() != n_assets {
            return Err(CounterfactError::length_mismatch(n_assets, input.pre_weights.len()));
        }
        if input.post_weights.len() != n_assets {
            return Err(CounterfactError::length_mismatch(n_assets, input.post_weights.len()));
        }

        let (paths, steps) = (tensor.n_paths(), tensor.n_steps());
        let weights = DMatrix::from_fn(n_assets, 2, |asset, side| {
            if side == 0 {
                input.pre_weights[asset]
            } else {
                input.post_weights[asset]
            }
        });
        let portfolio = tensor.step_returns() * weights;

        let baseline = DMatrix::from_fn(paths, steps, |p, t| portfolio[(p * steps + t, 0)]);
        let scenario = DMatrix::from_fn(paths, steps, |p, t| {
            let row = p * steps + t;
            if t < input.execution_step {
                portfolio[(row, 0)]
            } else {
                portfolio[(row, 1)] - input.daily_margin_cost
            }
        });

        Ok(ReturnMatrices { baseline, scenario })
    }

    /// Value both portfolios and derive per-path statistics.
    pub fn value(&self, tensor: &PriceTensor, input: &ValuationInput) -> Result<PathEnsemble> {
        let matrices = self.return_matrices(tensor, input)?;
        let to_paths = |m: &DMatrix<f64>, scale: f64| -> Vec<SimulationPath> {
            m.row_iter()
                .map(|row| {
                    let returns: Vec<f64> = row.iter().copied().collect();
                    SimulationPath::from_returns(&returns, scale, self.periods_per_year)
                })
                .collect()
        };
        Ok(PathEnsemble {
            baseline: to_paths(&matrices.baseline, 1.0),
            scenario: to_paths(&matrices.scenario, input.shock_ratio),
        })
    }
}
