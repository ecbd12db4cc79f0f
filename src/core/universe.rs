//! Static per-asset parameters used by the simulation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::types::Sector;

/// Per-asset simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetProfile {
    /// Annualized volatility.
    pub volatility: f64,
    /// Sharpe ratio used to derive the real-world drift.
    pub sharpe_ratio: f64,
    /// Sector used by the shock heuristics.
    pub sector: Sector,
    /// Last known price, needed to size share-count actions.
    pub reference_price: Option<f64>,
}

impl AssetProfile {
    /// Create a profile without a reference price.
    pub const fn new(volatility: f64, sharpe_ratio: f64, sector: Sector) -> Self {
        Self {
            volatility,
            sharpe_ratio,
            sector,
            reference_price: None,
        }
    }

    /// Annual real-world drift: `r_f + sharpe * sigma`.
    #[inline]
    pub fn drift(&self, risk_free_rate: f64) -> f64 {
        risk_free_rate + self.sharpe_ratio * self.volatility
    }
}

/// Lookup of asset parameters, injected into the engine.
pub trait AssetUniverse: Send + Sync {
    /// Parameters for `symbol`; unknown symbols get a default profile.
    fn profile(&self, symbol: &str) -> AssetProfile;

    /// Reference price for `symbol`, if known.
    fn reference_price(&self, symbol: &str) -> Option<f64> {
        self.profile(symbol).reference_price
    }
}

/// Profile applied to tickers missing from the table.
pub const DEFAULT_PROFILE: AssetProfile = AssetProfile::new(0.30, 0.30, Sector::Unknown);

const BUILTIN: &[(&str, f64, f64, Sector)] = &[
    ("SPY", 0.16, 0.45, Sector::BroadMarket),
    ("VTI", 0.17, 0.45, Sector::BroadMarket),
    ("QQQ", 0.22, 0.50, Sector::Technology),
    ("IWM", 0.22, 0.30, Sector::BroadMarket),
    ("AGG", 0.05, 0.30, Sector::Bonds),
    ("BND", 0.05, 0.30, Sector::Bonds),
    ("TLT", 0.15, 0.20, Sector::Bonds),
    ("GLD", 0.15, 0.20, Sector::Commodities),
    ("USO", 0.35, 0.10, Sector::Energy),
    ("XLE", 0.28, 0.30, Sector::Energy),
    ("XLF", 0.22, 0.35, Sector::Financials),
    ("XLU", 0.17, 0.30, Sector::Utilities),
    ("XLV", 0.16, 0.40, Sector::Healthcare),
    ("VNQ", 0.21, 0.25, Sector::RealEstate),
    ("AAPL", 0.28, 0.50, Sector::Technology),
    ("MSFT", 0.26, 0.55, Sector::Technology),
    ("NVDA", 0.50, 0.60, Sector::Technology),
    ("GOOGL", 0.30, 0.45, Sector::Technology),
    ("META", 0.38, 0.45, Sector::Technology),
    ("AMZN", 0.32, 0.45, Sector::ConsumerDiscretionary),
    ("TSLA", 0.60, 0.35, Sector::ConsumerDiscretionary),
    ("JPM", 0.25, 0.40, Sector::Financials),
    ("XOM", 0.28, 0.30, Sector::Energy),
    ("JNJ", 0.17, 0.35, Sector::Healthcare),
    ("PG", 0.16, 0.35, Sector::ConsumerStaples),
    ("CAT", 0.28, 0.35, Sector::Industrials),
    ("NEE", 0.22, 0.30, Sector::Utilities),
    ("BTC-USD", 0.65, 0.40, Sector::Crypto),
    ("ETH-USD", 0.80, 0.35, Sector::Crypto),
];

/// Table-backed universe with a default fallback.
#[derive(Debug, Clone)]
pub struct StaticUniverse {
    entries: HashMap<String, AssetProfile>,
    fallback: AssetProfile,
}

impl Default for StaticUniverse {
    fn default() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|&(sym, vol, sharpe, sector)| {
                (sym.to_string(), AssetProfile::new(vol, sharpe, sector))
            })
            .collect();
        Self {
            entries,
            fallback: DEFAULT_PROFILE,
        }
    }
}

impl StaticUniverse {
    /// Add or replace an asset.
    pub fn with_asset(mut self, symbol: impl Into<String>, profile: AssetProfile) -> Self {
        self.entries.insert(symbol.into(), profile);
        self
    }

    /// Set the reference price of an asset, creating it from the fallback if needed.
    pub fn with_price(mut self, symbol: impl Into<String>, price: f64) -> Self {
        let fallback = self.fallback;
        self.entries
            .entry(symbol.into())
            .or_insert(fallback)
            .reference_price = Some(price);
        self
    }
}

impl AssetUniverse for StaticUniverse {
    fn profile(&self, symbol: &str) -> AssetProfile {
        self.entries.get(symbol).copied().unwrap_or(self.fallback)
    }
}
