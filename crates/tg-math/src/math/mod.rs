//! Core math modules.

pub mod cholesky;
pub mod gaussian;
pub mod matrix;
pub mod stable;
