//! TrendGuard math utilities.

pub mod math;

pub use math::cholesky::Cholesky;
pub use math::gaussian::{MultivariateNormal, COVARIANCE_RIDGE};
pub use math::matrix::{Matrix, MatrixError};
pub use math::stable::*;
