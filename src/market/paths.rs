//! Correlated jump-diffusion price path generation.
//!
//! Each asset follows geometric Brownian motion with a real-world drift
//! (`r_f + sharpe * sigma`). Shocks are correlated through a Cholesky factor
//! and every step may additionally carry a rare, heavy-tailed, downside-skewed
//! jump. All draws come from one caller-owned generator, so a fixed seed
//! reproduces the whole tensor exactly.

use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, StudentT};

use crate::core::config::JumpConfig;
use crate::core::error::{CounterfactError, Result};
use crate::core::universe::AssetProfile;
use crate::market::correlation::CorrelationFactor;

/// Annualized drift and volatility of one asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetDynamics {
    pub drift: f64,
    pub volatility: f64,
}

impl AssetDynamics {
    /// Derive dynamics from a profile and the risk-free rate.
    pub fn from_profile(profile: &AssetProfile, risk_free_rate: f64) -> Self {
        Self {
            drift: profile.drift(risk_free_rate),
            volatility: profile.volatility,
        }
    }
}

/// Simulated prices: one `paths x (steps + 1)` matrix per asset.
#[derive(Debug, Clone)]
pub struct PriceTensor {
    tickers: Vec<String>,
    prices: Vec<DMatrix<f64>>,
    n_paths: usize,
    n_steps: usize,
}

impl PriceTensor {
    /// Asset tickers in column order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[inline]
    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Price matrix of one asset.
    pub fn asset_prices(&self, asset: usize) -> &DMatrix<f64> {
        &self.prices[asset]
    }

    /// Price of `asset` on `path` at `step`.
    #[inline]
    pub fn price(&self, asset: usize, path: usize, step: usize) -> f64 {
        self.prices[asset][(path, step)]
    }

    /// Simple step returns laid out as `(paths * steps) x assets`.
    ///
    /// Row `path * steps + step` holds the return from `step` to `step + 1`.
    pub fn step_returns(&self) -> DMatrix<f64> {
        let steps = self.n_steps;
        DMatrix::from_fn(self.n_paths * steps, self.n_assets(), |row, asset| {
            let (path, step) = (row / steps, row % steps);
            let p = &self.prices[asset];
            p[(path, step + 1)] / p[(path, step)] - 1.0
        })
    }
}

/// Generator of correlated price paths.
#[derive(Debug, Clone)]
pub struct PricePathGenerator {
    dynamics: Vec<AssetDynamics>,
    factor: CorrelationFactor,
    jump: JumpConfig,
    dt: f64,
}

impl PricePathGenerator {
    /// Create a generator; `factor` must match the number of assets.
    pub fn new(
        dynamics: Vec<AssetDynamics>,
        factor: CorrelationFactor,
        jump: JumpConfig,
        dt: f64,
    ) -> Result<Self> {
        if factor.lower.nrows() != dynamics.len() {
            return Err(CounterfactError::length_mismatch(
                dynamics.len(),
                factor.lower.nrows(),
            ));
        }
        if !(dt > 0.0) {
            return Err(CounterfactError::invalid_parameter("dt must be positive"));
        }
        Ok(Self {
            dynamics,
            factor,
            jump,
            dt,
        })
    }

    /// Per-step jump probability, kept inside [0, 1].
    #[inline]
    pub fn jump_probability(&self) -> f64 {
        (self.jump.intensity * self.dt).clamp(0.0, 1.0)
    }

    /// Simulate `n_paths` paths of `n_steps` steps.
    ///
    /// # Arguments
    /// * `rng` - Run-owned generator; the only source of randomness
    /// * `tickers` - Asset keys, same order as the dynamics
    /// * `initial_prices` - Price of each asset at step 0
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        tickers: &[String],
        initial_prices: &[f64],
        n_paths: usize,
        n_steps: usize,
    ) -> Result<PriceTensor> {
        let n = self.dynamics.len();
        if n == 0 {
            return Err(CounterfactError::empty_data("price path generation (no assets)"));
        }
        if n_paths == 0 || n_steps == 0 {
            return Err(CounterfactError::empty_data(
                "price path generation (zero paths or steps)",
            ));
        }
        if tickers.len() != n {
            return Err(CounterfactError::length_mismatch(n, tickers.len()));
        }
        if initial_prices.len() != n {
            return Err(CounterfactError::length_mismatch(n, initial_prices.len()));
        }

        let p_jump = self.jump_probability();
        let jump_dist = if p_jump > 0.0 {
            Some(StudentT::new(self.jump.degrees_of_freedom).map_err(|e| {
                CounterfactError::invalid_parameter(format!("jump distribution: {e}"))
            })?)
        } else {
            None
        };

        let sqrt_dt = self.dt.sqrt();
        let log_drift: Vec<f64> = self
            .dynamics
            .iter()
            .map(|d| (d.drift - 0.5 * d.volatility * d.volatility) * self.dt)
            .collect();
        let diffusion: Vec<f64> = self.dynamics.iter().map(|d| d.volatility * sqrt_dt).collect();

        let mut prices: Vec<DMatrix<f64>> = initial_prices
            .iter()
            .map(|&p0| {
                let mut m = DMatrix::zeros(n_paths, n_steps + 1);
                m.column_mut(0).fill(p0);
                m
            })
            .collect();

        let mut z = vec![0.0; n];
        let mut eps = vec![0.0; n];

        for step in 0..n_steps {
            for path in 0..n_paths {
                for zi in z.iter_mut() {
                    *zi = StandardNormal.sample(rng);
                }
                self.factor.correlate(&z, &mut eps);

                for asset in 0..n {
                    let mut growth = (log_drift[asset] + diffusion[asset] * eps[asset]).exp();

                    if let Some(dist) = &jump_dist {
                        if rng.random::<f64>() < p_jump {
                            let magnitude =
                                (dist.sample(rng).abs() * self.jump.scale).min(self.jump.max_jump);
                            let sign = if rng.random::<f64>() < self.jump.negative_probability {
                                -1.0
                            } else {
                                1.0
                            };
                            growth *= 1.0 + sign * magnitude;
                        }
                    }

                    let prev = prices[asset][(path, step)];
                    prices[asset][(path, step + 1)] = prev * growth;
                }
            }
        }

        Ok(PriceTensor {
            tickers: tickers.to_vec(),
            prices,
            n_paths,
            n_steps,
        })
    }
}
