//! Bounded scoring of a decision comparison.
//!
//! Each headline delta is pushed through a logistic centred at 50, oriented
//! so that a worsening risk metric lowers the score. The six sub-scores are
//! blended with fixed weights and the composite is mapped to a verdict.

use crate::core::config::ScoringConfig;
use crate::core::types::{DecisionComparison, DecisionScore, LeverageInfo, Verdict};

pub const RETURN_WEIGHT: f64 = 0.25;
pub const RISK_WEIGHT: f64 = 0.20;
pub const TAIL_WEIGHT: f64 = 0.15;
pub const DRAWDOWN_WEIGHT: f64 = 0.15;
pub const EFFICIENCY_WEIGHT: f64 = 0.15;
pub const STABILITY_WEIGHT: f64 = 0.10;

const RETURN_FACTOR_PCT: f64 = 0.25;
const VOLATILITY_FACTOR_PCT: f64 = 0.5;
const TAIL_FACTOR_PCT: f64 = 0.5;
const DRAWDOWN_FACTOR_PCT: f64 = 0.5;
const EFFICIENCY_FACTOR: f64 = 0.5;

/// Logistic transform into [0, 100], centred at 50.
///
/// The exponent is clamped to `[-clamp, clamp]` so extreme inputs saturate
/// instead of overflowing.
#[inline]
pub fn logistic_score(x: f64, steepness: f64, clamp: f64) -> f64 {
    let arg = (-steepness * x).clamp(-clamp, clamp);
    100.0 / (1.0 + arg.exp())
}

/// Run facts the scorer turns into warnings.
#[derive(Debug, Clone, Default)]
pub struct ScoreContext {
    /// Decision opens or enlarges a short.
    pub has_short: bool,
    /// Cutover delay in trading days.
    pub execution_delay_days: usize,
    /// Horizon in trading days.
    pub horizon_days: usize,
    /// Leverage after the decision.
    pub leverage: LeverageInfo,
    /// Annual margin rate used for the leverage factor.
    pub annual_margin_rate: f64,
    /// A correlation fallback replaced empirical data.
    pub correlation_fallback: bool,
    /// Closed-form approximation instead of simulation.
    pub approximation: bool,
    /// Execution notes to pass through as warnings.
    pub notes: Vec<String>,
    /// Confidence to report.
    pub confidence: f64,
}

/// The six sub-scores, in blend order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub return_score: f64,
    pub risk_score: f64,
    pub tail_score: f64,
    pub drawdown_score: f64,
    pub efficiency_score: f64,
    pub stability_score: f64,
}

impl SubScores {
    /// Weighted composite in [0, 100].
    pub fn composite(&self) -> f64 {
        let blended = RETURN_WEIGHT * self.return_score
            + RISK_WEIGHT * self.risk_score
            + TAIL_WEIGHT * self.tail_score
            + DRAWDOWN_WEIGHT * self.drawdown_score
            + EFFICIENCY_WEIGHT * self.efficiency_score
            + STABILITY_WEIGHT * self.stability_score;
        blended.clamp(0.0, 100.0)
    }
}

/// Maps comparisons to scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Sub-scores of a comparison.
    pub fn sub_scores(&self, cmp: &DecisionComparison) -> SubScores {
        let c = &self.config;
        let clamp = c.exponent_clamp;
        SubScores {
            return_score: logistic_score(cmp.delta_return_pct, c.return_steepness, clamp),
            risk_score: logistic_score(-cmp.delta_volatility_pct, c.risk_steepness, clamp),
            tail_score: logistic_score(cmp.delta_tail_loss_pct, c.tail_steepness, clamp),
            drawdown_score: logistic_score(cmp.delta_drawdown_pct, c.drawdown_steepness, clamp),
            efficiency_score: logistic_score(cmp.information_ratio, c.efficiency_steepness, clamp),
            stability_score: logistic_score(c.stability_input, 1.0, clamp),
        }
    }

    /// Score a comparison.
    pub fn score(&self, cmp: &DecisionComparison, ctx: &ScoreContext) -> DecisionScore {
        let subs = self.sub_scores(cmp);
        let composite = subs.composite();

        DecisionScore {
            return_score: subs.return_score,
            risk_score: subs.risk_score,
            tail_score: subs.tail_score,
            drawdown_score: subs.drawdown_score,
            efficiency_score: subs.efficiency_score,
            stability_score: subs.stability_score,
            composite,
            verdict: Verdict::from_score(composite),
            key_factors: key_factors(cmp, ctx),
            warnings: warnings(ctx),
            confidence: ctx.confidence.clamp(0.0, 1.0),
        }
    }
}

fn direction_word(value: f64, up: &'static str, down: &'static str) -> &'static str {
    if value >= 0.0 {
        up
    } else {
        down
    }
}

fn key_factors(cmp: &DecisionComparison, ctx: &ScoreContext) -> Vec<String> {
    let mut factors = Vec::new();

    if cmp.delta_return_pct.abs() >= RETURN_FACTOR_PCT {
        factors.push(format!(
            "Expected return {} by {:.2} pp over {} trading days",
            direction_word(cmp.delta_return_pct, "rises", "falls"),
            cmp.delta_return_pct.abs(),
            cmp.horizon_days
        ));
    }
    if cmp.delta_volatility_pct.abs() >= VOLATILITY_FACTOR_PCT {
        factors.push(format!(
            "Annualized volatility {} by {:.2} pp",
            direction_word(cmp.delta_volatility_pct, "increases", "decreases"),
            cmp.delta_volatility_pct.abs()
        ));
    }
    if cmp.delta_tail_loss_pct.abs() >= TAIL_FACTOR_PCT {
        factors.push(format!(
            "Tail loss (1st percentile) {} by {:.2} pp",
            direction_word(cmp.delta_tail_loss_pct, "improves", "worsens"),
            cmp.delta_tail_loss_pct.abs()
        ));
    }
    if cmp.delta_drawdown_pct.abs() >= DRAWDOWN_FACTOR_PCT {
        factors.push(format!(
            "Median drawdown {} by {:.2} pp",
            direction_word(cmp.delta_drawdown_pct, "shrinks", "deepens"),
            cmp.delta_drawdown_pct.abs()
        ));
    }
    if cmp.information_ratio.abs() >= EFFICIENCY_FACTOR {
        factors.push(format!(
            "Risk-adjusted effect is {} (information ratio {:.2})",
            direction_word(cmp.information_ratio, "favorable", "unfavorable"),
            cmp.information_ratio
        ));
    }
    if ctx.leverage.is_leveraged() {
        factors.push(format!(
            "Adds {:.1}% leverage at a margin cost of {:.2}% per year on borrowed exposure",
            ctx.leverage.leverage_amount * 100.0,
            ctx.annual_margin_rate * 100.0
        ));
    }
    if factors.is_empty() {
        factors.push("Decision has a negligible effect on simulated outcomes".to_string());
    }
    factors
}

fn warnings(ctx: &ScoreContext) -> Vec<String> {
    let mut warnings = Vec::new();

    if ctx.approximation {
        warnings.push(
            "Approximation: closed-form estimate without simulation; treat figures as indicative"
                .to_string(),
        );
    }
    if ctx.has_short {
        warnings.push(
            "Short positions have unbounded loss potential and may incur borrow costs".to_string(),
        );
    }
    if ctx.execution_delay_days > 0 {
        if ctx.execution_delay_days >= ctx.horizon_days {
            warnings.push(format!(
                "Execution delay of {} trading days reaches past the {}-day horizon; the decision never takes effect here",
                ctx.execution_delay_days, ctx.horizon_days
            ));
        } else {
            warnings.push(format!(
                "Execution is delayed by {} trading days; prices can move before the trade is placed",
                ctx.execution_delay_days
            ));
        }
    }
    if ctx.leverage.is_leveraged() {
        warnings.push(format!(
            "Gross exposure of {:.1}% exceeds 100%; losses are amplified and margin calls are possible",
            ctx.leverage.gross_exposure * 100.0
        ));
    }
    if ctx.correlation_fallback {
        warnings.push(
            "Historical correlations unavailable; a flat correlation assumption was used".to_string(),
        );
    }
    warnings.extend(ctx.notes.iter().cloned());
    warnings
}
