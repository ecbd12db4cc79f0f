//! Engine configuration.
//!
//! Every field has a default so a partial JSON document is enough to
//! override individual knobs.

use serde::{Deserialize, Serialize};

use crate::core::error::{CounterfactError, Result};

/// Jump-risk calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Expected number of jumps per asset per year.
    pub intensity: f64,
    /// Probability that a jump is negative.
    pub negative_probability: f64,
    /// Degrees of freedom of the Student-t magnitude distribution.
    pub degrees_of_freedom: f64,
    /// Scale applied to the absolute Student-t draw.
    pub scale: f64,
    /// Cap on a single jump's absolute size (fraction, < 1).
    pub max_jump: f64,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            intensity: 0.5,
            negative_probability: 0.7,
            degrees_of_freedom: 3.0,
            scale: 0.03,
            max_jump: 0.5,
        }
    }
}

impl JumpConfig {
    /// Configuration with jumps switched off.
    pub fn disabled() -> Self {
        Self {
            intensity: 0.0,
            ..Self::default()
        }
    }
}

/// Steepness constants for the logistic sub-scores.
///
/// Each constant is per percentage point of the corresponding delta, except
/// `efficiency` which is per unit of information ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub return_steepness: f64,
    pub risk_steepness: f64,
    pub tail_steepness: f64,
    pub drawdown_steepness: f64,
    pub efficiency_steepness: f64,
    /// Input to the stability transform; zero keeps it neutral.
    pub stability_input: f64,
    /// Bound applied to the logistic exponent before `exp`.
    pub exponent_clamp: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            return_steepness: 0.5,
            risk_steepness: 0.3,
            tail_steepness: 0.25,
            drawdown_steepness: 0.3,
            efficiency_steepness: 1.0,
            stability_input: 0.0,
            exponent_clamp: 50.0,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of Monte Carlo paths.
    pub n_paths: usize,
    /// Horizon in trading days (one step per day).
    pub horizon_days: usize,
    /// Trading days per year.
    pub trading_days_per_year: f64,
    /// Annual risk-free rate.
    pub risk_free_rate: f64,
    /// Annual spread over the risk-free rate charged on borrowed exposure.
    pub margin_spread: f64,
    /// Off-diagonal entry of the flat fallback correlation matrix.
    pub base_correlation: f64,
    /// Starting price of every simulated asset.
    pub initial_price: f64,
    /// Bound on the absolute information ratio.
    pub information_ratio_bound: f64,
    /// Below this path count the score confidence is reduced.
    pub min_paths_for_full_confidence: usize,
    /// Fixed seed; a fresh one is drawn per run when absent.
    pub seed: Option<u64>,
    /// Keep per-path series in the outcome.
    pub keep_paths: bool,
    /// Jump-risk calibration.
    pub jump: JumpConfig,
    /// Scoring calibration.
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_paths: 2_000,
            horizon_days: 21,
            trading_days_per_year: 252.0,
            risk_free_rate: 0.04,
            margin_spread: 0.015,
            base_correlation: 0.3,
            initial_price: 100.0,
            information_ratio_bound: 5.0,
            min_paths_for_full_confidence: 500,
            seed: None,
            keep_paths: false,
            jump: JumpConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set paths and horizon.
    pub fn with_paths(mut self, n_paths: usize, horizon_days: usize) -> Self {
        self.n_paths = n_paths;
        self.horizon_days = horizon_days;
        self
    }

    /// Step size in years.
    #[inline]
    pub fn dt(&self) -> f64 {
        1.0 / self.trading_days_per_year
    }

    /// Horizon in years.
    #[inline]
    pub fn horizon_years(&self) -> f64 {
        self.horizon_days as f64 / self.trading_days_per_year
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.trading_days_per_year > 0.0) {
            return Err(CounterfactError::invalid_config(
                "trading_days_per_year must be positive",
            ));
        }
        if !(self.base_correlation > -1.0 && self.base_correlation < 1.0) {
            return Err(CounterfactError::invalid_config(format!(
                "base_correlation must lie in (-1, 1), got {}",
                self.base_correlation
            )));
        }
        if !(self.initial_price > 0.0) {
            return Err(CounterfactError::invalid_config("initial_price must be positive"));
        }
        if !(self.information_ratio_bound > 0.0) {
            return Err(CounterfactError::invalid_config(
                "information_ratio_bound must be positive",
            ));
        }
        let jump = &self.jump;
        if jump.intensity < 0.0 || !jump.intensity.is_finite() {
            return Err(CounterfactError::invalid_config("jump intensity must be >= 0"));
        }
        if !(0.0..=1.0).contains(&jump.negative_probability) {
            return Err(CounterfactError::invalid_config(
                "negative jump probability must lie in [0, 1]",
            ));
        }
        if !(jump.degrees_of_freedom > 0.0) {
            return Err(CounterfactError::invalid_config(
                "jump degrees of freedom must be positive",
            ));
        }
        if !(jump.max_jump > 0.0 && jump.max_jump < 1.0) {
            return Err(CounterfactError::invalid_config("max_jump must lie in (0, 1)"));
        }
        if !(self.scoring.exponent_clamp > 0.0) {
            return Err(CounterfactError::invalid_config("exponent_clamp must be positive"));
        }
        Ok(())
    }
}
