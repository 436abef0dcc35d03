//! Dense row-major matrices with their shape fixed at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from matrix construction and factorization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("matrix has no rows")]
    Empty,

    #[error("ragged matrix: row {row} has {got} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("matrix is {rows}x{cols}, expected a square matrix")]
    NotSquare { rows: usize, cols: usize },

    #[error("matrix is not positive definite (pivot {pivot} = {value})")]
    NotPositiveDefinite { pivot: usize, value: f64 },
}

/// Dense `f64` matrix stored row-major.
///
/// The shape is checked once in the constructors; accessors index without
/// re-validating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// n×n identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Square matrix with `diag` on the diagonal.
    pub fn from_diagonal(diag: &[f64]) -> Self {
        let n = diag.len();
        let mut m = Self::zeros(n, n);
        for (i, &d) in diag.iter().enumerate() {
            m.data[i * n + i] = d;
        }
        m
    }

    /// Build from nested rows. Every row must have the length of the first.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MatrixError> {
        let first = rows.first().ok_or(MatrixError::Empty)?;
        let cols = first.as_ref().len();
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MatrixError::Ragged {
                    row: i,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }

    /// Column `col` collected into a vector.
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    /// Flat row-major storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Nested-row copy, mainly for serialization into config files.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(|r| r.to_vec()).collect()
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Symmetric within `tol`, scaled by the larger magnitude of each pair.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                let a = self.get(i, j);
                let b = self.get(j, i);
                let scale = a.abs().max(b.abs()).max(1.0);
                if (a - b).abs() > tol * scale {
                    return false;
                }
            }
        }
        true
    }

    /// Copy with `ridge` added to every diagonal entry.
    pub fn with_diagonal_loading(&self, ridge: f64) -> Result<Self, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let mut out = self.clone();
        for i in 0..self.rows {
            out.data[i * self.cols + i] += ridge;
        }
        Ok(out)
    }

    /// Copy with every entry multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_keeps_row_major_order() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 2);
        assert_eq!(m.get(2, 1), 6.0);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.column(0), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::Ragged {
                row: 1,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn from_rows_rejects_empty() {
        let rows: Vec<Vec<f64>> = Vec::new();
        assert_eq!(Matrix::from_rows(&rows).unwrap_err(), MatrixError::Empty);
    }

    #[test]
    fn diagonal_loading_only_touches_diagonal() {
        let m = Matrix::zeros(2, 2).with_diagonal_loading(0.5).unwrap();
        assert_eq!(m, Matrix::from_diagonal(&[0.5, 0.5]));
    }

    #[test]
    fn diagonal_loading_requires_square() {
        let err = Matrix::zeros(2, 3).with_diagonal_loading(1.0).unwrap_err();
        assert_eq!(err, MatrixError::NotSquare { rows: 2, cols: 3 });
    }

    #[test]
    fn symmetry_check() {
        let sym = Matrix::from_rows(&[[2.0, 0.3], [0.3, 1.0]]).unwrap();
        assert!(sym.is_symmetric(1e-12));
        let asym = Matrix::from_rows(&[[2.0, 0.3], [0.1, 1.0]]).unwrap();
        assert!(!asym.is_symmetric(1e-6));
    }

    #[test]
    fn identity_and_scaled() {
        let m = Matrix::identity(3).scaled(0.08);
        assert_eq!(m.get(1, 1), 0.08);
        assert_eq!(m.get(0, 2), 0.0);
        assert_eq!(m.to_rows().len(), 3);
    }
}
