//! Comparison, scoring and closed-form approximation.

pub mod approximation;
pub mod comparator;
pub mod scorer;

pub use approximation::{FastApproximator, APPROXIMATION_CONFIDENCE};
pub use comparator::{information_ratio, sharpe_ratio, Comparator};
pub use scorer::{ScoreContext, Scorer, SubScores};
