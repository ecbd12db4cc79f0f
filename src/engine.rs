//! Temporal simulation engine.
//!
//! Runs one decision against one portfolio: price paths are simulated once
//! and valued twice (baseline and scenario), so every difference between the
//! two sides comes from the decision and not from sampling noise.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::analysis::approximation::{FastApproximator, APPROXIMATION_CONFIDENCE};
use crate::analysis::comparator::Comparator;
use crate::analysis::scorer::{ScoreContext, Scorer};
use crate::core::config::EngineConfig;
use crate::core::error::{CounterfactError, Result};
use crate::core::types::{
    DecisionComparison, DecisionScore, LeverageInfo, PortfolioState, StructuredDecision,
};
use crate::core::universe::{AssetUniverse, StaticUniverse};
use crate::execution::executor::{DecisionExecutor, ExecutionPlan};
use crate::market::correlation::{resolve_factor, CorrelationSource};
use crate::market::paths::{AssetDynamics, PricePathGenerator};
use crate::market::shocks::{portfolio_shock_ratio, MarketShockInjector};
use crate::portfolio::valuator::{PathEnsemble, PortfolioValuator, ValuationInput};

/// Confidence of a full simulation with empirical correlations.
pub const FULL_CONFIDENCE: f64 = 0.9;
/// Confidence deducted for each degraded input.
pub const CONFIDENCE_PENALTY: f64 = 0.1;

/// Everything a caller gets back from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Baseline vs. scenario statistics.
    pub comparison: DecisionComparison,
    /// Bounded score, verdict and explanations.
    pub score: DecisionScore,
    /// Leverage carried by the post-decision weights.
    pub leverage: LeverageInfo,
    /// Step at which the scenario switches to post-decision weights.
    pub execution_step: usize,
    /// Seed that reproduces this run; `None` for approximations.
    pub seed: Option<u64>,
    /// Per-path series, kept when `EngineConfig::keep_paths` is set.
    pub paths: Option<PathEnsemble>,
}

/// One entry of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub decision: StructuredDecision,
    pub portfolio: PortfolioState,
}

/// Decision simulation engine.
///
/// Collaborators are injected at construction; the engine holds no
/// mutable state, so one instance can serve concurrent runs.
#[derive(Clone)]
pub struct TemporalEngine {
    config: EngineConfig,
    universe: Arc<dyn AssetUniverse>,
    correlation: Option<Arc<dyn CorrelationSource>>,
}

impl Default for TemporalEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TemporalEngine {
    /// Create an engine with the built-in asset table and no correlation source.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            universe: Arc::new(StaticUniverse::default()),
            correlation: None,
        }
    }

    /// Create an engine after validating `config`.
    pub fn try_new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Use a different asset universe.
    pub fn with_universe(mut self, universe: Arc<dyn AssetUniverse>) -> Self {
        self.universe = universe;
        self
    }

    /// Use an empirical correlation source.
    pub fn with_correlation_source(mut self, source: Arc<dyn CorrelationSource>) -> Self {
        self.correlation = Some(source);
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Simulate `decision` against `portfolio`.
    ///
    /// Uses the configured seed, or a fresh one that is recorded in the
    /// outcome.
    pub fn simulate(
        &self,
        decision: &StructuredDecision,
        portfolio: &PortfolioState,
    ) -> Result<SimulationOutcome> {
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        self.simulate_with_seed(decision, portfolio, seed)
    }

    /// Simulate with an explicit seed.
    ///
    /// # Arguments
    /// * `decision` - Structured decision to evaluate
    /// * `portfolio` - Holdings before the decision
    /// * `seed` - Seed of the run's only random generator
    ///
    /// # Returns
    /// Comparison, score and leverage; identical inputs and seed give
    /// identical outcomes.
    pub fn simulate_with_seed(
        &self,
        decision: &StructuredDecision,
        portfolio: &PortfolioState,
        seed: u64,
    ) -> Result<SimulationOutcome> {
        self.config.validate()?;
        let cfg = &self.config;
        let plan = self.plan(decision, portfolio)?;
        if cfg.n_paths == 0 || cfg.horizon_days == 0 {
            return Err(CounterfactError::empty_data(
                "simulation (zero paths or zero horizon)",
            ));
        }

        let span = info_span!(
            "simulate",
            seed,
            paths = cfg.n_paths,
            steps = cfg.horizon_days,
            assets = plan.tickers.len()
        );
        let _guard = span.enter();

        let factor = resolve_factor(
            self.correlation.as_deref(),
            &plan.tickers,
            cfg.base_correlation,
        );
        let correlation_fallback = factor.is_fallback() && plan.tickers.len() > 1;

        let dynamics: Vec<AssetDynamics> = plan
            .tickers
            .iter()
            .map(|t| AssetDynamics::from_profile(&self.universe.profile(t), cfg.risk_free_rate))
            .collect();
        let generator = PricePathGenerator::new(dynamics, factor, cfg.jump, cfg.dt())?;

        let mut rng = StdRng::seed_from_u64(seed);
        let initial_prices = vec![cfg.initial_price; plan.tickers.len()];
        let tensor = generator.generate(
            &mut rng,
            &plan.tickers,
            &initial_prices,
            cfg.n_paths,
            cfg.horizon_days,
        )?;

        let shock_ratio = self.shock_ratio(decision, &plan);
        let ensemble = PortfolioValuator::new(cfg.trading_days_per_year)
            .value(&tensor, &ValuationInput::from_plan(&plan, shock_ratio))?;
        let comparison = Comparator::new(cfg).compare(&ensemble)?;

        let mut confidence = FULL_CONFIDENCE;
        if correlation_fallback {
            confidence -= CONFIDENCE_PENALTY;
        }
        if cfg.n_paths < cfg.min_paths_for_full_confidence {
            confidence -= CONFIDENCE_PENALTY;
        }
        let ctx = self.score_context(decision, &plan, correlation_fallback, false, confidence);
        let score = Scorer::new(cfg.scoring).score(&comparison, &ctx);

        info!(
            delta_return_pct = comparison.delta_return_pct,
            composite = score.composite,
            verdict = score.verdict.as_str(),
            "simulation complete"
        );

        Ok(SimulationOutcome {
            comparison,
            score,
            leverage: plan.leverage,
            execution_step: plan.execution_step,
            seed: Some(seed),
            paths: cfg.keep_paths.then_some(ensemble),
        })
    }

    /// Closed-form estimate of the same comparison, without simulation.
    pub fn approximate(
        &self,
        decision: &StructuredDecision,
        portfolio: &PortfolioState,
    ) -> Result<SimulationOutcome> {
        self.config.validate()?;
        let cfg = &self.config;
        let plan = self.plan(decision, portfolio)?;
        if cfg.horizon_days == 0 {
            return Err(CounterfactError::empty_data("approximation (zero horizon)"));
        }

        let shock_ratio = self.shock_ratio(decision, &plan);
        let comparison =
            FastApproximator::new(self.universe.as_ref(), cfg).compare(&plan, shock_ratio);
        let ctx = self.score_context(decision, &plan, false, true, APPROXIMATION_CONFIDENCE);
        let score = Scorer::new(cfg.scoring).score(&comparison, &ctx);

        debug!(composite = score.composite, "approximation complete");

        Ok(SimulationOutcome {
            comparison,
            score,
            leverage: plan.leverage,
            execution_step: plan.execution_step,
            seed: None,
            paths: None,
        })
    }

    /// Simulate independent requests in parallel.
    ///
    /// Request `i` runs with seed `base + i`, where `base` is the configured
    /// seed or a fresh one. Each request owns its generator, so results match
    /// sequential [`simulate_with_seed`](Self::simulate_with_seed) calls.
    pub fn simulate_batch(&self, requests: &[SimulationRequest]) -> Vec<Result<SimulationOutcome>> {
        let base = self.config.seed.unwrap_or_else(|| rand::rng().random());
        requests
            .par_iter()
            .enumerate()
            .map(|(i, req)| {
                self.simulate_with_seed(&req.decision, &req.portfolio, base.wrapping_add(i as u64))
            })
            .collect()
    }

    fn plan(
        &self,
        decision: &StructuredDecision,
        portfolio: &PortfolioState,
    ) -> Result<ExecutionPlan> {
        let plan = DecisionExecutor::new(self.universe.as_ref(), &self.config)
            .execute(decision, portfolio);
        if plan.tickers.is_empty() {
            return Err(CounterfactError::empty_data(
                "simulation (no tickers in portfolio or decision)",
            ));
        }
        Ok(plan)
    }

    /// Value ratio the shocks impose on the scenario at t = 0.
    ///
    /// Uses the weights the scenario actually holds at t = 0.
    fn shock_ratio(&self, decision: &StructuredDecision, plan: &ExecutionPlan) -> f64 {
        if decision.shocks.is_empty() {
            return 1.0;
        }
        let multipliers = MarketShockInjector::new(self.universe.as_ref())
            .multipliers(&decision.shocks, &plan.tickers);
        let weights = if plan.execution_step == 0 {
            &plan.post_weights
        } else {
            &plan.pre_weights
        };
        let ratio = portfolio_shock_ratio(weights, &multipliers);
        debug!(shocks = decision.shocks.len(), ratio, "shocks applied");
        ratio
    }

    fn score_context(
        &self,
        decision: &StructuredDecision,
        plan: &ExecutionPlan,
        correlation_fallback: bool,
        approximation: bool,
        confidence: f64,
    ) -> ScoreContext {
        ScoreContext {
            has_short: decision.has_short(),
            execution_delay_days: plan.execution_step,
            horizon_days: self.config.horizon_days,
            leverage: plan.leverage,
            annual_margin_rate: self.config.risk_free_rate + self.config.margin_spread,
            correlation_fallback,
            approximation,
            notes: plan.notes.clone(),
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ActionDirection, InstrumentAction, MarketShock, Sector};

    fn small_engine() -> TemporalEngine {
        TemporalEngine::new(EngineConfig::default().with_paths(200, 10).with_seed(7))
    }

    fn portfolio() -> PortfolioState {
        PortfolioState::new(100_000.0, [("SPY", 0.6), ("AGG", 0.4)])
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let engine = small_engine();
        let decision = StructuredDecision::trade(vec![InstrumentAction::percent(
            "SPY",
            ActionDirection::Sell,
            10.0,
        )]);
        let a = engine.simulate(&decision, &portfolio()).unwrap();
        let b = engine.simulate(&decision, &portfolio()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, Some(7));
    }

    #[test]
    fn test_fresh_seed_is_recorded() {
        let engine = TemporalEngine::new(EngineConfig::default().with_paths(50, 5));
        let decision = StructuredDecision::trade(vec![]);
        let outcome = engine.simulate(&decision, &portfolio()).unwrap();
        let seed = outcome.seed.unwrap();
        let replay = engine.simulate_with_seed(&decision, &portfolio(), seed).unwrap();
        assert_eq!(outcome.comparison, replay.comparison);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let engine = small_engine();
        let empty = PortfolioState::new(1.0, Vec::<(String, f64)>::new());
        let result = engine.simulate(&StructuredDecision::trade(vec![]), &empty);
        assert!(matches!(result, Err(CounterfactError::EmptyData { .. })));

        let zero_paths = TemporalEngine::new(EngineConfig::default().with_paths(0, 10));
        let result = zero_paths.simulate(&StructuredDecision::trade(vec![]), &portfolio());
        assert!(matches!(result, Err(CounterfactError::EmptyData { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.base_correlation = 1.5;
        assert!(TemporalEngine::try_new(config.clone()).is_err());
        let result = TemporalEngine::new(config)
            .simulate(&StructuredDecision::trade(vec![]), &portfolio());
        assert!(matches!(result, Err(CounterfactError::InvalidConfig { .. })));
    }

    #[test]
    fn test_keep_paths() {
        let mut config = EngineConfig::default().with_paths(30, 5).with_seed(1);
        config.keep_paths = true;
        let outcome = TemporalEngine::new(config)
            .simulate(&StructuredDecision::trade(vec![]), &portfolio())
            .unwrap();
        let paths = outcome.paths.unwrap();
        assert_eq!(paths.len(), 30);
        assert_eq!(paths.baseline[0].values().len(), 5);
    }

    #[test]
    fn test_negative_shock_lowers_scenario() {
        let engine = small_engine();
        let decision = StructuredDecision::trade(vec![])
            .with_shock(MarketShock::sector(Sector::BroadMarket, -0.10));
        let outcome = engine.simulate(&decision, &portfolio()).unwrap();
        assert!(outcome.comparison.delta_return_pct < 0.0);
    }

    #[test]
    fn test_confidence_penalties() {
        let engine = small_engine();
        let outcome = engine
            .simulate(&StructuredDecision::trade(vec![]), &portfolio())
            .unwrap();
        // Flat correlation fallback and fewer than 500 paths.
        assert!((outcome.score.confidence - 0.7).abs() < 1e-12);

        let approx = engine
            .approximate(&StructuredDecision::trade(vec![]), &portfolio())
            .unwrap();
        assert_eq!(approx.score.confidence, APPROXIMATION_CONFIDENCE);
        assert!(approx.score.warnings[0].starts_with("Approximation"));
        assert_eq!(approx.seed, None);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let engine = small_engine();
        let requests = vec![
            SimulationRequest {
                decision: StructuredDecision::trade(vec![InstrumentAction::percent(
                    "AGG",
                    ActionDirection::Buy,
                    5.0,
                )]),
                portfolio: portfolio(),
            },
            SimulationRequest {
                decision: StructuredDecision::rebalance(vec![InstrumentAction::percent(
                    "SPY",
                    ActionDirection::Sell,
                    20.0,
                )]),
                portfolio: portfolio(),
            },
        ];
        let batch = engine.simulate_batch(&requests);
        for (i, (result, req)) in batch.into_iter().zip(&requests).enumerate() {
            let sequential = engine
                .simulate_with_seed(&req.decision, &req.portfolio, 7 + i as u64)
                .unwrap();
            assert_eq!(result.unwrap(), sequential);
        }
    }
}
