//! Error types for the counterfactual engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, CounterfactError>;

/// Error types for the simulation engine.
///
/// `DataUnavailable` and `NumericalInstability` are recovered inside the
/// engine with fallbacks; callers of `TemporalEngine::simulate` only ever see
/// the structural variants.
#[derive(Error, Debug)]
pub enum CounterfactError {
    /// External data (historical correlation) could not be obtained.
    #[error("Data unavailable: {message}")]
    DataUnavailable { message: String },

    /// A numerical routine could not complete (e.g. non positive-definite matrix).
    #[error("Numerical instability in {context}")]
    NumericalInstability { context: String },

    /// Data length mismatch between arrays.
    #[error("Data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Invalid parameter value.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Empty data error.
    #[error("Empty data provided for {context}")]
    EmptyData { context: String },
}

impl CounterfactError {
    /// Create a data unavailable error.
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            message: message.into(),
        }
    }

    /// Create a numerical instability error.
    pub fn numerical_instability(context: impl Into<String>) -> Self {
        Self::NumericalInstability {
            context: context.into(),
        }
    }

    /// Create a length mismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an empty data error.
    pub fn empty_data(context: impl Into<String>) -> Self {
        Self::EmptyData {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for CounterfactError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}
