//! Core types, configuration and errors.

pub mod config;
pub mod error;
pub mod types;
pub mod universe;

pub use config::{EngineConfig, JumpConfig, ScoringConfig};
pub use error::{CounterfactError, Result};
pub use types::*;
pub use universe::{AssetProfile, AssetUniverse, StaticUniverse};
