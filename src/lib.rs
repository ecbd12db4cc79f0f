//! Counterfact - paired Monte Carlo evaluation of portfolio decisions.
//!
//! This crate provides:
//! - Correlated price paths with jump risk (GBM plus Student-t jumps)
//! - Deterministic macro shock injection
//! - Decision execution with leverage and margin accounting
//! - Vectorized baseline/scenario valuation over shared paths
//! - Comparison statistics, bounded scoring and verdicts
//! - A closed-form approximation mode

pub mod analysis;
pub mod core;
pub mod engine;
pub mod execution;
pub mod market;
pub mod metrics;
pub mod portfolio;

pub use crate::core::{
    CounterfactError, DecisionComparison, DecisionScore, EngineConfig, PortfolioState, Result,
    StructuredDecision, Verdict,
};
pub use engine::{SimulationOutcome, SimulationRequest, TemporalEngine};
