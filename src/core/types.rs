//! Core data types for the counterfactual engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of decision being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    /// Incremental trade; weights are not renormalized and leverage may arise.
    Trade,
    /// Full redistribution; post-decision absolute weights sum to one.
    Rebalance,
}

/// Direction of a single instrument action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionDirection {
    /// Add long exposure.
    #[serde(alias = "long")]
    Buy,
    /// Remove long exposure.
    #[serde(alias = "reduce")]
    Sell,
    /// Create or enlarge a negative weight.
    Short,
    /// Move a negative weight toward zero.
    Cover,
}

/// Size of an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "unit", content = "value")]
pub enum PositionSize {
    /// Percent of total portfolio value (5.0 = 5%).
    PercentOfPortfolio(f64),
    /// Absolute currency amount.
    Currency(f64),
    /// Number of shares; needs a reference price.
    Shares(f64),
}

/// When an action executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "days")]
pub enum ExecutionTiming {
    /// Executes at the first simulated step.
    #[default]
    Immediate,
    /// Executes after the given number of trading days.
    DelayDays(u32),
}

impl ExecutionTiming {
    /// Delay in trading days.
    #[inline]
    pub fn delay_days(self) -> usize {
        match self {
            ExecutionTiming::Immediate => 0,
            ExecutionTiming::DelayDays(days) => days as usize,
        }
    }
}

/// One leg of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentAction {
    /// Opaque instrument key.
    pub symbol: String,
    /// Action direction.
    pub direction: ActionDirection,
    /// Action size.
    pub size: PositionSize,
    /// Execution timing.
    #[serde(default)]
    pub timing: ExecutionTiming,
}

impl InstrumentAction {
    /// Create an immediate action.
    pub fn new(symbol: impl Into<String>, direction: ActionDirection, size: PositionSize) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            size,
            timing: ExecutionTiming::Immediate,
        }
    }

    /// Shorthand for a percent-of-portfolio action.
    pub fn percent(symbol: impl Into<String>, direction: ActionDirection, percent: f64) -> Self {
        Self::new(symbol, direction, PositionSize::PercentOfPortfolio(percent))
    }

    /// Delay execution by `days` trading days.
    pub fn delayed(mut self, days: u32) -> Self {
        self.timing = ExecutionTiming::DelayDays(days);
        self
    }
}

/// Economic sector used by the shock heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Technology,
    Financials,
    Energy,
    Utilities,
    RealEstate,
    Healthcare,
    ConsumerDiscretionary,
    ConsumerStaples,
    Industrials,
    BroadMarket,
    Bonds,
    Commodities,
    Crypto,
    Unknown,
}

/// Macro shock category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockCategory {
    /// Policy rate change, magnitude in percentage points.
    RateChange,
    /// Oil / commodity price move, magnitude as a fraction.
    OilShock,
    /// Move of one sector, magnitude as a fraction.
    SectorShock,
    /// GDP growth surprise, magnitude in percentage points.
    GdpShock,
}

/// A one-off deterministic macro shock applied at t=0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketShock {
    /// Shock category.
    pub category: ShockCategory,
    /// Targeted sector (used by sector shocks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Sector>,
    /// Signed magnitude.
    pub magnitude: f64,
}

impl MarketShock {
    /// Create a shock without a sector target.
    pub fn new(category: ShockCategory, magnitude: f64) -> Self {
        Self {
            category,
            target: None,
            magnitude,
        }
    }

    /// Create a sector shock.
    pub fn sector(target: Sector, magnitude: f64) -> Self {
        Self {
            category: ShockCategory::SectorShock,
            target: Some(target),
            magnitude,
        }
    }
}

/// A structured portfolio decision produced by the upstream parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDecision {
    /// Decision type.
    pub decision_type: DecisionType,
    /// Ordered instrument actions.
    pub actions: Vec<InstrumentAction>,
    /// Optional macro shocks.
    #[serde(default)]
    pub shocks: Vec<MarketShock>,
}

impl StructuredDecision {
    /// Create a trade decision.
    pub fn trade(actions: Vec<InstrumentAction>) -> Self {
        Self {
            decision_type: DecisionType::Trade,
            actions,
            shocks: Vec::new(),
        }
    }

    /// Create a rebalance decision.
    pub fn rebalance(actions: Vec<InstrumentAction>) -> Self {
        Self {
            decision_type: DecisionType::Rebalance,
            actions,
            shocks: Vec::new(),
        }
    }

    /// Attach a macro shock.
    pub fn with_shock(mut self, shock: MarketShock) -> Self {
        self.shocks.push(shock);
        self
    }

    /// Whether any leg opens or enlarges a short.
    pub fn has_short(&self) -> bool {
        self.actions
            .iter()
            .any(|a| a.direction == ActionDirection::Short)
    }

    /// Largest execution delay across all legs, in trading days.
    pub fn max_delay_days(&self) -> usize {
        self.actions
            .iter()
            .map(|a| a.timing.delay_days())
            .max()
            .unwrap_or(0)
    }
}

/// Current portfolio holdings as signed weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Total portfolio value in currency.
    pub total_value: f64,
    /// Ticker to signed weight (negative = short).
    pub weights: BTreeMap<String, f64>,
}

impl PortfolioState {
    /// Create a portfolio from `(ticker, weight)` pairs.
    pub fn new<I, S>(total_value: f64, weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            total_value,
            weights: weights.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Leverage metadata returned alongside post-decision weights.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeverageInfo {
    /// Sum of long weights plus absolute short weights.
    pub gross_exposure: f64,
    /// `max(0, gross_exposure - 1)`.
    pub leverage_amount: f64,
    /// Margin carrying cost charged per simulated step (fraction of value).
    pub daily_margin_cost: f64,
}

impl LeverageInfo {
    /// Whether the decision carries borrowed exposure.
    #[inline]
    pub fn is_leveraged(&self) -> bool {
        self.leverage_amount > 0.0
    }
}

/// Point statistics of one simulated ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnsembleStats {
    /// Mean terminal return percentage.
    pub expected_return_pct: f64,
    /// Mean annualized volatility percentage.
    pub volatility_pct: f64,
    /// 5th percentile terminal return percentage.
    pub var_95_pct: f64,
    /// Median of per-path maximum drawdowns (negative percentage).
    pub median_drawdown_pct: f64,
    /// 1st percentile terminal return percentage.
    pub tail_loss_pct: f64,
    /// Sharpe ratio over the horizon.
    pub sharpe_ratio: f64,
}

/// Paired baseline vs. scenario comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionComparison {
    /// Baseline (no decision) statistics.
    pub baseline: EnsembleStats,
    /// Scenario (decision executed) statistics.
    pub scenario: EnsembleStats,
    /// Scenario minus baseline expected return.
    pub delta_return_pct: f64,
    /// Scenario minus baseline volatility.
    pub delta_volatility_pct: f64,
    /// Scenario minus baseline VaR-95.
    pub delta_var_95_pct: f64,
    /// Scenario minus baseline median drawdown.
    pub delta_drawdown_pct: f64,
    /// Scenario minus baseline tail loss.
    pub delta_tail_loss_pct: f64,
    /// Delta return over the std-dev of paired return differences, clamped.
    pub information_ratio: f64,
    /// Number of paths behind the statistics (0 for approximations).
    pub n_paths: usize,
    /// Horizon in trading days.
    pub horizon_days: usize,
}

/// Five-level verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    StronglyPositive,
    ModeratelyPositive,
    Neutral,
    Negative,
    Dangerous,
}

impl Verdict {
    /// Map a composite score to a verdict.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Verdict::StronglyPositive
        } else if score >= 55.0 {
            Verdict::ModeratelyPositive
        } else if score >= 45.0 {
            Verdict::Neutral
        } else if score >= 30.0 {
            Verdict::Negative
        } else {
            Verdict::Dangerous
        }
    }

    /// Snake-case label.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::StronglyPositive => "strongly_positive",
            Verdict::ModeratelyPositive => "moderately_positive",
            Verdict::Neutral => "neutral",
            Verdict::Negative => "negative",
            Verdict::Dangerous => "dangerous",
        }
    }
}

/// Bounded score of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionScore {
    /// Return sub-score [0, 100].
    pub return_score: f64,
    /// Volatility sub-score [0, 100].
    pub risk_score: f64,
    /// Tail-loss sub-score [0, 100].
    pub tail_score: f64,
    /// Drawdown sub-score [0, 100].
    pub drawdown_score: f64,
    /// Information-ratio sub-score [0, 100].
    pub efficiency_score: f64,
    /// Stability sub-score [0, 100].
    pub stability_score: f64,
    /// Weighted composite [0, 100].
    pub composite: f64,
    /// Verdict derived from the composite.
    pub verdict: Verdict,
    /// Human-readable drivers of the score.
    pub key_factors: Vec<String>,
    /// Human-readable risk warnings.
    pub warnings: Vec<String>,
    /// Confidence in [0, 1].
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_delay() {
        let decision = StructuredDecision::trade(vec![
            InstrumentAction::percent("SPY", ActionDirection::Sell, 5.0),
            InstrumentAction::percent("AGG", ActionDirection::Buy, 5.0).delayed(4),
        ]);
        assert_eq!(decision.max_delay_days(), 4);
        assert!(!decision.has_short());
    }

    #[test]
    fn test_decision_deserialize() {
        let json = r#"{
            "decision_type": "trade",
            "actions": [
                {"symbol": "AAPL", "direction": "long",
                 "size": {"unit": "percent_of_portfolio", "value": 5.0},
                 "timing": {"kind": "delay_days", "days": 3}}
            ]
        }"#;
        let decision: StructuredDecision = serde_json::from_str(json).unwrap();
        assert_eq!(decision.actions[0].direction, ActionDirection::Buy);
        assert_eq!(decision.actions[0].timing, ExecutionTiming::DelayDays(3));
        assert!(decision.shocks.is_empty());
    }

    #[test]
    fn test_verdict_serializes_snake_case() {
        let s = serde_json::to_string(&Verdict::ModeratelyPositive).unwrap();
        assert_eq!(s, "\"moderately_positive\"");
    }
}
