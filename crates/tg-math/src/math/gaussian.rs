//! Multivariate normal density with diagonal loading.
//!
//! The covariance is regularized as `Σ + ridge·I` before factorization, so a
//! positive-semidefinite covariance that is singular (for example all zeros, or
//! a rank-deficient sample covariance) still yields a finite density. The
//! regularization slightly inflates the variance in every direction.

use crate::math::cholesky::Cholesky;
use crate::math::matrix::{Matrix, MatrixError};
use crate::math::stable::LN_2PI;

/// Diagonal loading applied to every emission covariance.
pub const COVARIANCE_RIDGE: f64 = 1e-6;

/// N(mean, Σ + ridge·I) with the factorization cached.
#[derive(Debug, Clone, PartialEq)]
pub struct MultivariateNormal {
    mean: Vec<f64>,
    covariance: Matrix,
    chol: Cholesky,
    /// -0.5 (D ln 2π + ln|Σ + ridge·I|)
    log_norm: f64,
}

impl MultivariateNormal {
    /// Build with the default ridge of [`COVARIANCE_RIDGE`].
    pub fn new(mean: Vec<f64>, covariance: Matrix) -> Result<Self, MatrixError> {
        Self::with_ridge(mean, covariance, COVARIANCE_RIDGE)
    }

    /// Build with an explicit ridge.
    ///
    /// Fails if the covariance is not square, does not match the mean's
    /// dimension, or is still not positive definite after loading.
    pub fn with_ridge(mean: Vec<f64>, covariance: Matrix, ridge: f64) -> Result<Self, MatrixError> {
        if !covariance.is_square() {
            return Err(MatrixError::NotSquare {
                rows: covariance.rows(),
                cols: covariance.cols(),
            });
        }
        if covariance.rows() != mean.len() {
            return Err(MatrixError::DimensionMismatch {
                expected: mean.len(),
                got: covariance.rows(),
            });
        }
        let loaded = covariance.with_diagonal_loading(ridge)?;
        let chol = Cholesky::factor(&loaded)?;
        let d = mean.len() as f64;
        let log_norm = -0.5 * (d * LN_2PI + chol.log_det());
        Ok(Self {
            mean,
            covariance,
            chol,
            log_norm,
        })
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Covariance as supplied, before loading.
    pub fn covariance(&self) -> &Matrix {
        &self.covariance
    }

    /// Log density at `x`. `x.len()` must equal `dim()`.
    pub fn log_pdf(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.dim());
        let diff: Vec<f64> = x.iter().zip(&self.mean).map(|(a, m)| a - m).collect();
        self.log_norm - 0.5 * self.chol.mahalanobis_sq(&diff)
    }

    /// Density at `x`; never negative, may underflow to 0.
    pub fn pdf(&self, x: &[f64]) -> f64 {
        self.log_pdf(x).exp()
    }
}
