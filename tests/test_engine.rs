//! Integration tests for the temporal simulation engine.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use counterfact::core::types::{
    ActionDirection, InstrumentAction, MarketShock, PortfolioState, PositionSize, ShockCategory,
    StructuredDecision,
};
use counterfact::core::universe::{AssetProfile, StaticUniverse};
use counterfact::core::{EngineConfig, Sector};
use counterfact::engine::{SimulationRequest, TemporalEngine};
use counterfact::execution::DecisionExecutor;
use counterfact::market::{FixedCorrelation, NoCorrelationHistory};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn three_asset_portfolio() -> PortfolioState {
    PortfolioState::new(100_000.0, [("SPY", 0.5), ("AGG", 0.3), ("AAPL", 0.2)])
}

fn engine(n_paths: usize, horizon: usize, seed: u64) -> TemporalEngine {
    TemporalEngine::new(EngineConfig::default().with_paths(n_paths, horizon).with_seed(seed))
}

fn tickers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_determinism_with_fixed_seed() {
    init_tracing();
    let decision = StructuredDecision::trade(vec![InstrumentAction::percent(
        "AAPL",
        ActionDirection::Buy,
        10.0,
    )]);
    let a = engine(300, 21, 42)
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();
    let b = engine(300, 21, 42)
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();
    assert_eq!(a.comparison, b.comparison);
    assert_eq!(a.score, b.score);

    let c = engine(300, 21, 43)
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();
    assert_ne!(a.comparison.baseline, c.comparison.baseline);
}

#[test]
fn test_no_op_decision_has_identical_sides() {
    let mut config = EngineConfig::default().with_paths(200, 15).with_seed(5);
    config.keep_paths = true;
    let outcome = TemporalEngine::new(config)
        .simulate(&StructuredDecision::trade(vec![]), &three_asset_portfolio())
        .unwrap();

    let paths = outcome.paths.unwrap();
    assert_eq!(paths.baseline, paths.scenario);
    assert_eq!(outcome.comparison.delta_return_pct, 0.0);
    assert_eq!(outcome.comparison.delta_volatility_pct, 0.0);
    assert_eq!(outcome.comparison.information_ratio, 0.0);
}

#[test]
fn test_delayed_short_diverges_at_execution_step() {
    let mut config = EngineConfig::default().with_paths(100, 21).with_seed(11);
    config.keep_paths = true;
    let decision = StructuredDecision::trade(vec![InstrumentAction::percent(
        "AAPL",
        ActionDirection::Short,
        4.0,
    )
    .delayed(3)]);

    let outcome = TemporalEngine::new(config)
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();
    assert_eq!(outcome.execution_step, 3);
    assert!(!outcome.leverage.is_leveraged());

    let paths = outcome.paths.unwrap();
    for (b, s) in paths.baseline.iter().zip(&paths.scenario) {
        for t in 0..3 {
            assert_eq!(b.values()[t], s.values()[t]);
        }
        assert_ne!(b.values()[3], s.values()[3]);
    }

    let warnings = outcome.score.warnings.join("\n");
    assert!(warnings.contains("Short positions"));
    assert!(warnings.contains("delayed by 3"));
}

#[test]
fn test_rebalance_conserves_gross_exposure() {
    let decision = StructuredDecision::rebalance(vec![
        InstrumentAction::percent("SPY", ActionDirection::Sell, 20.0),
        InstrumentAction::percent("GLD", ActionDirection::Buy, 35.0),
    ]);
    let outcome = engine(200, 10, 3)
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();
    assert_abs_diff_eq!(outcome.leverage.gross_exposure, 1.0, epsilon = 1e-12);
    assert_eq!(outcome.leverage.leverage_amount, 0.0);
    assert_eq!(outcome.leverage.daily_margin_cost, 0.0);

    let universe = StaticUniverse::default();
    let config = EngineConfig::default();
    let plan =
        DecisionExecutor::new(&universe, &config).execute(&decision, &three_asset_portfolio());
    let gross: f64 = plan.post_weights.iter().map(|w| w.abs()).sum();
    assert_abs_diff_eq!(gross, 1.0, epsilon = 1e-12);
    assert!(plan.post_weight("GLD").unwrap() > 0.0);
}

#[test]
fn test_buying_on_full_allocation_creates_leverage() {
    let portfolio = PortfolioState::new(100_000.0, [("AAPL", 1.0)]);
    let decision = StructuredDecision::trade(vec![InstrumentAction::percent(
        "AAPL",
        ActionDirection::Buy,
        5.0,
    )]);
    let outcome = engine(200, 21, 9).simulate(&decision, &portfolio).unwrap();

    assert_abs_diff_eq!(outcome.leverage.gross_exposure, 1.05, epsilon = 1e-12);
    assert_abs_diff_eq!(outcome.leverage.leverage_amount, 0.05, epsilon = 1e-12);
    assert_abs_diff_eq!(
        outcome.leverage.daily_margin_cost,
        0.05 * (0.04 + 0.015) / 252.0,
        epsilon = 1e-15
    );
    let factors = outcome.score.key_factors.join("\n");
    assert!(factors.contains("leverage"));
}

#[test]
fn test_one_day_horizon_bounds_delta() {
    let decision = StructuredDecision::trade(vec![InstrumentAction::percent(
        "AAPL",
        ActionDirection::Buy,
        10.0,
    )]);
    let outcome = engine(2_000, 1, 17)
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();
    assert!(outcome.comparison.delta_return_pct.abs() < 0.5);
    assert_eq!(outcome.comparison.horizon_days, 1);
}

#[test]
fn test_one_day_leveraged_buy_bounds_delta() {
    let portfolio = PortfolioState::new(100_000.0, [("AAPL", 1.0)]);
    let decision = StructuredDecision::trade(vec![InstrumentAction::percent(
        "AAPL",
        ActionDirection::Buy,
        5.0,
    )]);
    let outcome = engine(2_000, 1, 23).simulate(&decision, &portfolio).unwrap();

    assert_abs_diff_eq!(outcome.leverage.leverage_amount, 0.05, epsilon = 1e-9);
    assert!(outcome.comparison.delta_return_pct.abs() < 0.5);
    assert_eq!(outcome.comparison.horizon_days, 1);
}

#[test]
fn test_no_op_on_leveraged_portfolio_pays_margin() {
    let portfolio = PortfolioState::new(100_000.0, [("SPY", 1.2), ("TLT", -0.3)]);
    let outcome = engine(1_000, 21, 31)
        .simulate(&StructuredDecision::trade(vec![]), &portfolio)
        .unwrap();

    // Existing leverage is financed in the scenario only.
    assert_abs_diff_eq!(outcome.leverage.leverage_amount, 0.5, epsilon = 1e-12);
    assert!(outcome.comparison.delta_return_pct < 0.0);
    assert!(outcome.comparison.delta_return_pct > -1.0);
}

#[test]
fn test_correlation_failure_still_produces_comparison() {
    init_tracing();
    let decision = StructuredDecision::trade(vec![InstrumentAction::percent(
        "SPY",
        ActionDirection::Sell,
        10.0,
    )]);
    let outcome = engine(500, 21, 21)
        .with_correlation_source(Arc::new(NoCorrelationHistory))
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();

    assert_eq!(outcome.comparison.n_paths, 500);
    assert!(outcome.comparison.delta_return_pct.is_finite());
    assert!(outcome
        .score
        .warnings
        .iter()
        .any(|w| w.contains("flat correlation")));
    assert_abs_diff_eq!(outcome.score.confidence, 0.8, epsilon = 1e-12);
}

#[test]
fn test_empirical_correlation_keeps_full_confidence() {
    let source = FixedCorrelation::new(
        tickers(&["AAPL", "AGG", "SPY"]),
        vec![
            vec![1.0, -0.1, 0.7],
            vec![-0.1, 1.0, -0.2],
            vec![0.7, -0.2, 1.0],
        ],
    );
    let outcome = engine(500, 10, 2)
        .with_correlation_source(Arc::new(source))
        .simulate(&StructuredDecision::trade(vec![]), &three_asset_portfolio())
        .unwrap();
    assert_abs_diff_eq!(outcome.score.confidence, 0.9, epsilon = 1e-12);
    assert!(!outcome
        .score
        .warnings
        .iter()
        .any(|w| w.contains("correlation")));
}

#[test]
fn test_shocks_move_scenario_only() {
    let decision = StructuredDecision::trade(vec![])
        .with_shock(MarketShock::new(ShockCategory::RateChange, 1.0))
        .with_shock(MarketShock::new(ShockCategory::GdpShock, -2.0));
    let shocked = engine(300, 10, 8)
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();
    let plain = engine(300, 10, 8)
        .simulate(&StructuredDecision::trade(vec![]), &three_asset_portfolio())
        .unwrap();

    assert_eq!(shocked.comparison.baseline, plain.comparison.baseline);
    assert!(shocked.comparison.delta_return_pct < -1.0);
}

#[test]
fn test_unpriced_share_order_is_noted() {
    let decision = StructuredDecision::trade(vec![InstrumentAction::new(
        "ZZZZ",
        ActionDirection::Buy,
        PositionSize::Shares(10.0),
    )]);
    let outcome = engine(100, 5, 1)
        .simulate(&decision, &three_asset_portfolio())
        .unwrap();
    assert_eq!(outcome.comparison.delta_return_pct, 0.0);
    assert!(outcome.score.warnings.iter().any(|w| w.contains("ZZZZ")));
}

#[test]
fn test_share_order_uses_reference_price() {
    let universe = StaticUniverse::default().with_asset(
        "ACME",
        AssetProfile {
            reference_price: Some(50.0),
            ..AssetProfile::new(0.25, 0.4, Sector::Industrials)
        },
    );
    let decision = StructuredDecision::trade(vec![InstrumentAction::new(
        "ACME",
        ActionDirection::Buy,
        PositionSize::Shares(100.0),
    )]);
    let portfolio = PortfolioState::new(100_000.0, [("SPY", 0.5)]);
    let outcome = engine(100, 5, 1)
        .with_universe(Arc::new(universe))
        .simulate(&decision, &portfolio)
        .unwrap();
    assert_abs_diff_eq!(outcome.leverage.gross_exposure, 0.55, epsilon = 1e-12);
}

#[test]
fn test_batch_equals_sequential() {
    let engine = engine(150, 10, 100);
    let requests: Vec<SimulationRequest> = [5.0, 10.0, 15.0]
        .iter()
        .map(|&pct| SimulationRequest {
            decision: StructuredDecision::trade(vec![InstrumentAction::percent(
                "SPY",
                ActionDirection::Sell,
                pct,
            )]),
            portfolio: three_asset_portfolio(),
        })
        .collect();

    let batch = engine.simulate_batch(&requests);
    assert_eq!(batch.len(), 3);
    for (i, (result, req)) in batch.into_iter().zip(&requests).enumerate() {
        let expected = engine
            .simulate_with_seed(&req.decision, &req.portfolio, 100 + i as u64)
            .unwrap();
        assert_eq!(result.unwrap(), expected);
    }
}

#[test]
fn test_approximation_is_flagged() {
    let engine = engine(500, 21, 4);
    let decision = StructuredDecision::trade(vec![InstrumentAction::percent(
        "AGG",
        ActionDirection::Buy,
        10.0,
    )]);
    let approx = engine.approximate(&decision, &three_asset_portfolio()).unwrap();
    let full = engine.simulate(&decision, &three_asset_portfolio()).unwrap();

    assert!(approx.score.confidence < full.score.confidence);
    assert!(approx.score.warnings[0].starts_with("Approximation"));
    assert_eq!(approx.comparison.n_paths, 0);
    assert_eq!(approx.leverage, full.leverage);
}

#[test]
fn test_config_from_json() {
    let config = EngineConfig::from_json(r#"{"n_paths": 250, "horizon_days": 5, "seed": 12}"#)
        .unwrap();
    let outcome = TemporalEngine::try_new(config)
        .unwrap()
        .simulate(&StructuredDecision::trade(vec![]), &three_asset_portfolio())
        .unwrap();
    assert_eq!(outcome.seed, Some(12));
    assert_eq!(outcome.comparison.n_paths, 250);
    assert_eq!(outcome.comparison.horizon_days, 5);
}
