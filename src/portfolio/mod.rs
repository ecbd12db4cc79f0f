//! Portfolio valuation over simulated price paths.

pub mod path;
pub mod valuator;

pub use path::SimulationPath;
pub use valuator::{PathEnsemble, PortfolioValuator, ReturnMatrices, ValuationInput};
