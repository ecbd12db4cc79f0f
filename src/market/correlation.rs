//! Correlation sources and Cholesky factorization with fallbacks.
//!
//! An empirical matrix is preferred. When it cannot be fetched, fails
//! validation, or is not positive-definite, a flat matrix (unit diagonal,
//! constant off-diagonal) is used instead; if even that cannot be factored
//! the assets are simulated independently. None of these cases abort a run.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{CounterfactError, Result};

/// Best-effort provider of historical correlation matrices.
pub trait CorrelationSource: Send + Sync {
    /// Correlation matrix for `tickers`, rows and columns in the same order.
    fn correlation_matrix(&self, tickers: &[String]) -> Result<Vec<Vec<f64>>>;
}

/// Source backed by a precomputed matrix over a fixed ticker list.
#[derive(Debug, Clone)]
pub struct FixedCorrelation {
    tickers: Vec<String>,
    matrix: Vec<Vec<f64>>,
}

impl FixedCorrelation {
    /// Create a source for `tickers` with the given matrix.
    pub fn new(tickers: Vec<String>, matrix: Vec<Vec<f64>>) -> Self {
        Self { tickers, matrix }
    }
}

impl CorrelationSource for FixedCorrelation {
    fn correlation_matrix(&self, tickers: &[String]) -> Result<Vec<Vec<f64>>> {
        let index: Vec<usize> = tickers
            .iter()
            .map(|t| {
                self.tickers.iter().position(|k| k == t).ok_or_else(|| {
                    CounterfactError::data_unavailable(format!("no correlation history for {t}"))
                })
            })
            .collect::<Result<_>>()?;
        index
            .iter()
            .map(|&i| {
                index
                    .iter()
                    .map(|&j| {
                        self.matrix.get(i).and_then(|row| row.get(j)).copied().ok_or_else(|| {
                            CounterfactError::data_unavailable(format!(
                                "correlation matrix has no entry ({i}, {j})"
                            ))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect()
    }
}

/// Source that never has data; forces the flat fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrelationHistory;

impl CorrelationSource for NoCorrelationHistory {
    fn correlation_matrix(&self, _tickers: &[String]) -> Result<Vec<Vec<f64>>> {
        Err(CounterfactError::data_unavailable(
            "historical correlation service not configured",
        ))
    }
}

/// Which matrix the factor was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationOrigin {
    Empirical,
    FlatFallback,
    Identity,
}

/// Lower-triangular Cholesky factor plus its provenance.
#[derive(Debug, Clone)]
pub struct CorrelationFactor {
    /// `L` with `L * L^T = C`.
    pub lower: DMatrix<f64>,
    /// Matrix the factor came from.
    pub origin: CorrelationOrigin,
}

impl CorrelationFactor {
    /// Whether a fallback replaced the empirical matrix.
    pub fn is_fallback(&self) -> bool {
        self.origin != CorrelationOrigin::Empirical
    }

    /// Apply the factor to independent normals: `out = L * z`.
    #[inline]
    pub fn correlate(&self, indep: &[f64], out: &mut [f64]) {
        let n = self.lower.nrows();
        for i in 0..n {
            let mut sum = 0.0;
            for (j, z) in indep.iter().enumerate().take(i + 1) {
                sum += self.lower[(i, j)] * z;
            }
            out[i] = sum;
        }
    }
}

/// Flat correlation matrix: unit diagonal, `rho` elsewhere.
pub fn flat_correlation(n: usize, rho: f64) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| if i == j { 1.0 } else { rho })
}

/// Check shape, symmetry, unit diagonal and range of a correlation matrix.
pub fn validate_correlation(matrix: &[Vec<f64>], n: usize) -> Result<DMatrix<f64>> {
    if matrix.len() != n {
        return Err(CounterfactError::length_mismatch(n, matrix.len()));
    }
    if let Some(row) = matrix.iter().find(|row| row.len() != n) {
        return Err(CounterfactError::length_mismatch(n, row.len()));
    }
    let m = DMatrix::from_fn(n, n, |i, j| matrix[i][j]);
    for i in 0..n {
        if (m[(i, i)] - 1.0).abs() > 1e-8 {
            return Err(CounterfactError::invalid_parameter(format!(
                "correlation diagonal entry {i} is {}",
                m[(i, i)]
            )));
        }
        for j in 0..i {
            let v = m[(i, j)];
            if !v.is_finite() || v.abs() > 1.0 || (v - m[(j, i)]).abs() > 1e-8 {
                return Err(CounterfactError::invalid_parameter(format!(
                    "correlation entry ({i}, {j}) is invalid"
                )));
            }
        }
    }
    Ok(m)
}

/// Strict Cholesky factorization.
pub fn cholesky_lower(matrix: DMatrix<f64>) -> Result<DMatrix<f64>> {
    matrix
        .cholesky()
        .map(|c| c.l())
        .ok_or_else(|| CounterfactError::numerical_instability("cholesky factorization"))
}

/// Build a correlation factor for `tickers`, falling back as needed.
pub fn resolve_factor(
    source: Option<&dyn CorrelationSource>,
    tickers: &[String],
    base_correlation: f64,
) -> CorrelationFactor {
    let n = tickers.len();

    if let Some(source) = source {
        let empirical = source
            .correlation_matrix(tickers)
            .and_then(|m| validate_correlation(&m, n))
            .and_then(cholesky_lower);
        match empirical {
            Ok(lower) => {
                debug!(assets = n, "using empirical correlation");
                return CorrelationFactor {
                    lower,
                    origin: CorrelationOrigin::Empirical,
                };
            }
            Err(err) => warn!(error = %err, "empirical correlation rejected, using flat fallback"),
        }
    }

    match cholesky_lower(flat_correlation(n, base_correlation)) {
        Ok(lower) => CorrelationFactor {
            lower,
            origin: CorrelationOrigin::FlatFallback,
        },
        Err(err) => {
            warn!(
                error = %err,
                rho = base_correlation,
                "flat correlation not positive-definite, assets independent"
            );
            CorrelationFactor {
                lower: DMatrix::identity(n, n),
                origin: CorrelationOrigin::Identity,
            }
        }
    }
}
