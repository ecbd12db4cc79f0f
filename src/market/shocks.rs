//! Deterministic macro shocks applied to starting prices.
//!
//! A shock maps through a sector-beta table to one price multiplier per
//! asset. Several shocks compound multiplicatively. Only initial prices are
//! adjusted; the stochastic dynamics are left alone.

use crate::core::types::{MarketShock, Sector, ShockCategory};
use crate::core::universe::AssetUniverse;

/// Multiplier applied to assets whose sector is unknown, per shock.
pub const UNKNOWN_SECTOR_MULTIPLIER: f64 = 0.995;

/// Lowest multiplier a shock may produce.
pub const MIN_MULTIPLIER: f64 = 0.01;

/// Fraction of a sector shock that spills onto broad-market assets.
pub const BROAD_MARKET_SPILLOVER: f64 = 0.3;

/// Price sensitivity to a +1pp rate change.
fn rate_beta(sector: Sector) -> f64 {
    match sector {
        Sector::Technology => -0.08,
        Sector::RealEstate => -0.07,
        Sector::Bonds => -0.06,
        Sector::Utilities => -0.05,
        Sector::ConsumerDiscretionary | Sector::BroadMarket => -0.04,
        Sector::Industrials | Sector::Commodities => -0.03,
        Sector::Healthcare | Sector::ConsumerStaples => -0.02,
        Sector::Energy => -0.01,
        Sector::Financials => 0.02,
        Sector::Crypto => -0.10,
        Sector::Unknown => 0.0,
    }
}

/// Price sensitivity to a fractional oil-price move.
fn oil_beta(sector: Sector) -> f64 {
    match sector {
        Sector::Energy => 0.5,
        Sector::Commodities => 0.3,
        Sector::ConsumerDiscretionary => -0.15,
        Sector::Industrials => -0.12,
        Sector::BroadMarket => -0.06,
        Sector::Technology | Sector::ConsumerStaples | Sector::Crypto => -0.05,
        Sector::RealEstate => -0.04,
        Sector::Utilities | Sector::Financials => -0.03,
        Sector::Healthcare | Sector::Bonds => -0.02,
        Sector::Unknown => 0.0,
    }
}

/// Price sensitivity to a +1pp GDP growth surprise.
fn gdp_beta(sector: Sector) -> f64 {
    match sector {
        Sector::Crypto => 0.08,
        Sector::Financials | Sector::ConsumerDiscretionary | Sector::Industrials => 0.06,
        Sector::Technology | Sector::Energy => 0.05,
        Sector::BroadMarket | Sector::RealEstate => 0.04,
        Sector::Commodities => 0.03,
        Sector::ConsumerStaples | Sector::Healthcare => 0.015,
        Sector::Utilities => 0.01,
        Sector::Bonds => -0.02,
        Sector::Unknown => 0.0,
    }
}

fn sector_shock_beta(sector: Sector, target: Sector) -> f64 {
    if sector == target {
        1.0
    } else if sector == Sector::BroadMarket {
        BROAD_MARKET_SPILLOVER
    } else {
        0.0
    }
}

/// Price multiplier of one shock on an asset of `sector`.
pub fn shock_multiplier(shock: &MarketShock, sector: Sector) -> f64 {
    if sector == Sector::Unknown {
        return UNKNOWN_SECTOR_MULTIPLIER;
    }
    let beta = match shock.category {
        ShockCategory::RateChange => rate_beta(sector),
        ShockCategory::OilShock => oil_beta(sector),
        ShockCategory::GdpShock => gdp_beta(sector),
        ShockCategory::SectorShock => {
            sector_shock_beta(sector, shock.target.unwrap_or(Sector::BroadMarket))
        }
    };
    (1.0 + beta * shock.magnitude).max(MIN_MULTIPLIER)
}

/// Applies macro shocks to starting prices.
pub struct MarketShockInjector<'a> {
    universe: &'a dyn AssetUniverse,
}

impl<'a> MarketShockInjector<'a> {
    /// Create an injector resolving sectors through `universe`.
    pub fn new(universe: &'a dyn AssetUniverse) -> Self {
        Self { universe }
    }

    /// Compounded multiplier per ticker; all ones when there are no shocks.
    pub fn multipliers(&self, shocks: &[MarketShock], tickers: &[String]) -> Vec<f64> {
        tickers
            .iter()
            .map(|ticker| {
                let sector = self.universe.profile(ticker).sector;
                shocks
                    .iter()
                    .map(|shock| shock_multiplier(shock, sector))
                    .product()
            })
            .collect()
    }

    /// Shocked starting prices.
    pub fn apply(
        &self,
        shocks: &[MarketShock],
        tickers: &[String],
        initial_prices: &[f64],
    ) -> Vec<f64> {
        self.multipliers(shocks, tickers)
            .iter()
            .zip(initial_prices)
            .map(|(m, p)| m * p)
            .collect()
    }
}

/// Portfolio value ratio after a shock: `1 + sum(w_i * (m_i - 1))`.
pub fn portfolio_shock_ratio(weights: &[f64], multipliers: &[f64]) -> f64 {
    1.0 + weights
        .iter()
        .zip(multipliers)
        .map(|(w, m)| w * (m - 1.0))
        .sum::<f64>()
}
