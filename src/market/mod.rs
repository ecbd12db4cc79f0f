//! Market simulation: correlation, price paths and macro shocks.

pub mod correlation;
pub mod paths;
pub mod shocks;

pub use correlation::{
    CorrelationFactor, CorrelationOrigin, CorrelationSource, FixedCorrelation,
    NoCorrelationHistory,
};
pub use paths::{AssetDynamics, PricePathGenerator, PriceTensor};
pub use shocks::{portfolio_shock_ratio, MarketShockInjector};
