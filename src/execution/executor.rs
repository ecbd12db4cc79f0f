//! Decision execution: structured decision to post-decision weights.

use tracing::debug;

use crate::core::config::EngineConfig;
use crate::core::types::{
    ActionDirection, DecisionType, InstrumentAction, LeverageInfo, PortfolioState, PositionSize,
    StructuredDecision,
};
use crate::core::universe::AssetUniverse;

/// Result of executing a decision against a portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// Asset keys; portfolio holdings plus every traded symbol, sorted.
    pub tickers: Vec<String>,
    /// Weights before the decision, aligned with `tickers`.
    pub pre_weights: Vec<f64>,
    /// Weights after the decision, aligned with `tickers`.
    pub post_weights: Vec<f64>,
    /// Leverage carried by the post-decision weights.
    pub leverage: LeverageInfo,
    /// Step index at which post-decision weights take over.
    pub execution_step: usize,
    /// Conditions worth surfacing to the user (unpriced shares and so on).
    pub notes: Vec<String>,
}

impl ExecutionPlan {
    /// Post-decision weight of `symbol`.
    pub fn post_weight(&self, symbol: &str) -> Option<f64> {
        self.tickers
            .iter()
            .position(|t| t == symbol)
            .map(|i| self.post_weights[i])
    }

    /// Whether the cutover happens inside a horizon of `n_steps` steps.
    #[inline]
    pub fn executes_within(&self, n_steps: usize) -> bool {
        self.execution_step < n_steps
    }
}

/// Maps decisions to weight vectors with leverage accounting.
pub struct DecisionExecutor<'a> {
    universe: &'a dyn AssetUniverse,
    risk_free_rate: f64,
    margin_spread: f64,
    trading_days_per_year: f64,
}

impl<'a> DecisionExecutor<'a> {
    /// Create an executor using the engine's rate and calendar settings.
    pub fn new(universe: &'a dyn AssetUniverse, config: &EngineConfig) -> Self {
        Self {
            universe,
            risk_free_rate: config.risk_free_rate,
            margin_spread: config.margin_spread,
            trading_days_per_year: config.trading_days_per_year,
        }
    }

    /// Size of an action as a fraction of portfolio value.
    ///
    /// Returns `None` when the size cannot be converted (missing price or
    /// non-positive portfolio value).
    pub fn resolve_fraction(&self, action: &InstrumentAction, portfolio_value: f64) -> Option<f64> {
        match action.size {
            PositionSize::PercentOfPortfolio(pct) => Some(pct / 100.0),
            PositionSize::Currency(amount) => {
                (portfolio_value > 0.0).then(|| amount / portfolio_value)
            }
            PositionSize::Shares(shares) => {
                let price = self.universe.reference_price(&action.symbol)?;
                (portfolio_value > 0.0).then(|| shares * price / portfolio_value)
            }
        }
    }

    /// Leverage metadata for a weight vector.
    pub fn leverage_for(&self, weights: &[f64]) -> LeverageInfo {
        let gross_exposure: f64 = weights.iter().map(|w| w.abs()).sum();
        let leverage_amount = (gross_exposure - 1.0).max(0.0);
        LeverageInfo {
            gross_exposure,
            leverage_amount,
            daily_margin_cost: leverage_amount * (self.risk_free_rate + self.margin_spread)
                / self.trading_days_per_year,
        }
    }

    /// Execute `decision` against `portfolio`.
    pub fn execute(
        &self,
        decision: &StructuredDecision,
        portfolio: &PortfolioState,
    ) -> ExecutionPlan {
        let mut weights = portfolio.weights.clone();
        for action in &decision.actions {
            weights.entry(action.symbol.clone()).or_insert(0.0);
        }
        let tickers: Vec<String> = weights.keys().cloned().collect();
        let pre_weights: Vec<f64> = weights.values().copied().collect();
        let mut notes = Vec::new();

        for action in &decision.actions {
            let fraction = match self.resolve_fraction(action, portfolio.total_value) {
                Some(f) => f,
                None => {
                    notes.push(format!(
                        "Could not size {} (missing reference price or portfolio value); leg ignored",
                        action.symbol
                    ));
                    continue;
                }
            };
            if !fraction.is_finite() {
                notes.push(format!("Size for {} is not a finite number", action.symbol));
            }

            let w = weights.entry(action.symbol.clone()).or_insert(0.0);
            match action.direction {
                ActionDirection::Buy => *w += fraction,
                ActionDirection::Sell | ActionDirection::Short => *w -= fraction,
                ActionDirection::Cover => {
                    if *w < 0.0 {
                        *w = (*w + fraction).min(0.0);
                    } else {
                        notes.push(format!("No short position in {} to cover", action.symbol));
                    }
                }
            }
        }

        let mut post_weights: Vec<f64> = weights.values().copied().collect();

        let leverage = match decision.decision_type {
            DecisionType::Rebalance => {
                let gross: f64 = post_weights.iter().map(|w| w.abs()).sum();
                if gross > 0.0 {
                    post_weights.iter_mut().for_each(|w| *w /= gross);
                }
                LeverageInfo {
                    gross_exposure: post_weights.iter().map(|w| w.abs()).sum(),
                    leverage_amount: 0.0,
                    daily_margin_cost: 0.0,
                }
            }
            DecisionType::Trade => self.leverage_for(&post_weights),
        };

        let execution_step = decision.max_delay_days();
        debug!(
            legs = decision.actions.len(),
            gross = leverage.gross_exposure,
            leverage = leverage.leverage_amount,
            execution_step,
            "decision executed"
        );

        ExecutionPlan {
            tickers,
            pre_weights,
            post_weights,
            leverage,
            execution_step,
            notes,
        }
    }
}
