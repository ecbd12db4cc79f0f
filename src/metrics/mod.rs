//! Path-level and ensemble-level metrics.

pub mod drawdown;
pub mod stats;

pub use drawdown::{drawdown_curve, max_drawdown_from};
pub use stats::{annualized_volatility, mean, median, percentile, population_std};
