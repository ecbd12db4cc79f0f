//! Benchmark for decision simulation throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use counterfact::core::types::{
    ActionDirection, InstrumentAction, PortfolioState, StructuredDecision,
};
use counterfact::core::EngineConfig;
use counterfact::engine::TemporalEngine;

/// Equal-weight portfolio over the first `n` tickers of a fixed list.
fn sample_portfolio(n: usize) -> PortfolioState {
    let names = ["SPY", "AGG", "AAPL", "MSFT", "JPM", "XOM", "GLD", "TLT"];
    let n = n.min(names.len());
    PortfolioState::new(
        100_000.0,
        names[..n].iter().map(|s| (*s, 1.0 / n as f64)),
    )
}

fn sample_decision() -> StructuredDecision {
    StructuredDecision::trade(vec![
        InstrumentAction::percent("SPY", ActionDirection::Sell, 5.0),
        InstrumentAction::percent("GLD", ActionDirection::Buy, 5.0).delayed(2),
    ])
}

fn benchmark_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    let decision = sample_decision();

    for n_paths in [500, 2_000, 5_000] {
        let engine =
            TemporalEngine::new(EngineConfig::default().with_paths(n_paths, 21).with_seed(1));
        let portfolio = sample_portfolio(4);
        group.bench_with_input(BenchmarkId::new("paths", n_paths), &n_paths, |b, _| {
            b.iter(|| engine.simulate(black_box(&decision), black_box(&portfolio)))
        });
    }

    for n_assets in [2, 4, 8] {
        let engine = TemporalEngine::new(EngineConfig::default().with_seed(1));
        let portfolio = sample_portfolio(n_assets);
        group.bench_with_input(BenchmarkId::new("assets", n_assets), &n_assets, |b, _| {
            b.iter(|| engine.simulate(black_box(&decision), black_box(&portfolio)))
        });
    }

    group.finish();
}

fn benchmark_approximate(c: &mut Criterion) {
    let engine = TemporalEngine::default();
    let decision = sample_decision();
    let portfolio = sample_portfolio(8);

    c.bench_function("approximate", |b| {
        b.iter(|| engine.approximate(black_box(&decision), black_box(&portfolio)))
    });
}

criterion_group!(benches, benchmark_simulate, benchmark_approximate);
criterion_main!(benches);
