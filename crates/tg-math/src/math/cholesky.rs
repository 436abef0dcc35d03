//! Cholesky factorization of symmetric positive-definite matrices.
//!
//! `A = L Lᵀ` with `L` lower triangular. The factor gives the log-determinant
//! and the Mahalanobis quadratic form without forming `A⁻¹`.

use crate::math::matrix::{Matrix, MatrixError};

/// Lower-triangular Cholesky factor of an SPD matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Cholesky {
    lower: Matrix,
}

impl Cholesky {
    /// Factor `a`. Only the lower triangle of `a` is read.
    pub fn factor(a: &Matrix) -> Result<Self, MatrixError> {
        if !a.is_square() {
            return Err(MatrixError::NotSquare {
                rows: a.rows(),
                cols: a.cols(),
            });
        }
        let n = a.rows();
        let mut l = Matrix::zeros(n, n);
        for j in 0..n {
            let mut diag = a.get(j, j);
            for k in 0..j {
                diag -= l.get(j, k) * l.get(j, k);
            }
            if diag.is_nan() || diag <= 0.0 {
                return Err(MatrixError::NotPositiveDefinite {
                    pivot: j,
                    value: diag,
                });
            }
            let ljj = diag.sqrt();
            l.set(j, j, ljj);
            for i in (j + 1)..n {
                let mut s = a.get(i, j);
                for k in 0..j {
                    s -= l.get(i, k) * l.get(j, k);
                }
                l.set(i, j, s / ljj);
            }
        }
        Ok(Self { lower: l })
    }

    pub fn dim(&self) -> usize {
        self.lower.rows()
    }

    pub fn lower(&self) -> &Matrix {
        &self.lower
    }

    /// ln|A| = 2 Σ ln L_ii.
    pub fn log_det(&self) -> f64 {
        (0..self.dim()).map(|i| self.lower.get(i, i).ln()).sum::<f64>() * 2.0
    }

    /// Solve `L y = b` by forward substitution.
    ///
    /// `b.len()` must equal `dim()`; callers check it.
    pub fn solve_lower(&self, b: &[f64]) -> Vec<f64> {
        let n = self.dim();
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut s = b[i];
            for (k, yk) in y.iter().enumerate().take(i) {
                s -= self.lower.get(i, k) * yk;
            }
            y[i] = s / self.lower.get(i, i);
        }
        y
    }

    /// `dᵀ A⁻¹ d`, computed as `|L⁻¹ d|²`.
    pub fn mahalanobis_sq(&self, diff: &[f64]) -> f64 {
        self.solve_lower(diff).iter().map(|v| v * v).sum()
    }
}
