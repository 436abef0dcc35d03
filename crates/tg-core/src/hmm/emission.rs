//! Emission evaluation: Gaussian density of an observation under a state.
//!
//! Each covariance is loaded with `1e-6·I` before factorization. A singular
//! but positive-semidefinite covariance therefore still has a finite density;
//! an indefinite one is rejected when the model is built.

use tg_math::{Matrix, MatrixError, MultivariateNormal};

use super::error::HmmError;
use super::model::{GaussianHmm, SYMMETRY_TOLERANCE};

pub(super) fn build_emissions(
    means: Vec<Vec<f64>>,
    covariances: &[Vec<Vec<f64>>],
) -> Result<Vec<MultivariateNormal>, HmmError> {
    means
        .into_iter()
        .zip(covariances)
        .enumerate()
        .map(|(state, (mean, cov))| {
            let cov = Matrix::from_rows(cov).map_err(|e| invalid(state, &e))?;
            if !cov.is_symmetric(SYMMETRY_TOLERANCE) {
                return Err(HmmError::InvalidCovariance {
                    state,
                    reason: "not symmetric".to_string(),
                });
            }
            MultivariateNormal::new(mean, cov).map_err(|e| invalid(state, &e))
        })
        .collect()
}

fn invalid(state: usize, err: &MatrixError) -> HmmError {
    let reason = match err {
        MatrixError::NotPositiveDefinite { .. } => {
            format!("not positive semidefinite ({})", err)
        }
        other => other.to_string(),
    };
    HmmError::InvalidCovariance { state, reason }
}

impl GaussianHmm {
    /// Density of `observation` under state `state`'s Gaussian.
    ///
    /// Always ≥ 0; far from the mean it may underflow to exactly 0.
    pub fn emission_density(&self, observation: &[f64], state: usize) -> Result<f64, HmmError> {
        self.log_emission_density(observation, state).map(f64::exp)
    }

    /// Natural log of [`emission_density`](Self::emission_density), without
    /// underflow.
    pub fn log_emission_density(&self, observation: &[f64], state: usize) -> Result<f64, HmmError> {
        self.check_state(state)?;
        if observation.len() != self.dim() {
            return Err(HmmError::ObservationLength {
                expected: self.dim(),
                got: observation.len(),
            });
        }
        Ok(self.emissions[state].log_pdf(observation))
    }

    /// Emission densities of one observation under every state, in state
    /// order. The caller guarantees `observation.len() == dim()`.
    pub(crate) fn densities_unchecked(&self, observation: &[f64], out: &mut [f64]) {
        for (slot, emission) in out.iter_mut().zip(&self.emissions) {
            *slot = emission.pdf(observation);
        }
    }
}
