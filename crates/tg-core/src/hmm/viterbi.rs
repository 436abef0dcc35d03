//! Viterbi decoding in the log domain.
//!
//! Every probability p enters the recursion as `ln(p + ε)`, transition,
//! initial, and emission density alike, with ε = 1e-10 by default. The floor
//! keeps zero-probability entries finite; it is additive, so it also shifts
//! nonzero probabilities by a negligible amount.
//!
//! Ties between predecessors, and between final states, go to the lowest
//! state index.

use serde::Serialize;
use tracing::{debug, trace};

use tg_math::{argmax_first, ln_floor, log_sum_exp, LOG_FLOOR};

use super::error::HmmError;
use super::model::GaussianHmm;

/// Most likely state path for one observation sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViterbiPath {
    /// State index per time step, in input order.
    pub states: Vec<usize>,
    /// Floored log-score of the best path.
    pub log_score: f64,
    /// Share of the best final score among all final states' scores
    /// (softmax of the last trellis column). Not a posterior.
    pub confidence: f64,
}

impl ViterbiPath {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Labels for each step.
    pub fn labels(&self, model: &GaussianHmm) -> Vec<String> {
        self.states
            .iter()
            .map(|&s| model.states()[s].clone())
            .collect()
    }
}

/// Viterbi decoder with a configurable log floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViterbiDecoder {
    epsilon: f64,
}

impl Default for ViterbiDecoder {
    fn default() -> Self {
        Self {
            epsilon: LOG_FLOOR,
        }
    }
}

impl ViterbiDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `epsilon` as the additive floor. Must be finite and ≥ 0; with 0,
    /// impossible transitions score -inf.
    pub fn with_epsilon(epsilon: f64) -> Result<Self, HmmError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(HmmError::InvalidProbability {
                what: "log floor".to_string(),
                reason: format!("must be finite and non-negative, got {}", epsilon),
            });
        }
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Decode to state labels.
    pub fn decode<R: AsRef<[f64]>>(
        &self,
        model: &GaussianHmm,
        observations: &[R],
    ) -> Result<Vec<String>, HmmError> {
        self.decode_path(model, observations)
            .map(|path| path.labels(model))
    }

    /// Decode to state indices plus the path score.
    ///
    /// All observations are checked before any dynamic programming starts,
    /// so an error never leaves partial output.
    pub fn decode_path<R: AsRef<[f64]>>(
        &self,
        model: &GaussianHmm,
        observations: &[R],
    ) -> Result<ViterbiPath, HmmError> {
        check_observations(model, observations)?;

        let n = model.n_states();
        let t_len = observations.len();
        let eps = self.epsilon;

        debug!(
            steps = t_len,
            states = n,
            dim = model.dim(),
            epsilon = eps,
            "viterbi decode"
        );

        let log_a: Vec<f64> = model
            .transition()
            .as_slice()
            .iter()
            .map(|&p| ln_floor(p, eps))
            .collect();

        let mut density = vec![0.0; n];
        let mut log_delta = vec![0.0; t_len * n];
        let mut psi = vec![0usize; t_len * n];

        model.densities_unchecked(observations[0].as_ref(), &mut density);
        for (j, slot) in log_delta[..n].iter_mut().enumerate() {
            *slot = ln_floor(model.initial()[j], eps) + ln_floor(density[j], eps);
        }

        let mut scores = vec![0.0; n];
        for t in 1..t_len {
            model.densities_unchecked(observations[t].as_ref(), &mut density);
            let (prev, cur) = log_delta.split_at_mut(t * n);
            let prev = &prev[(t - 1) * n..];
            for j in 0..n {
                for (i, score) in scores.iter_mut().enumerate() {
                    *score = prev[i] + log_a[i * n + j];
                }
                let (best_i, best) = argmax_first(&scores).unwrap_or((0, f64::NEG_INFINITY));
                cur[j] = best + ln_floor(density[j], eps);
                psi[t * n + j] = best_i;
            }
            trace!(t, best = ?argmax_first(&cur[..n]).map(|(i, _)| i), "viterbi step");
        }

        let last = &log_delta[(t_len - 1) * n..];
        let (mut state, log_score) = argmax_first(last).unwrap_or((0, f64::NEG_INFINITY));
        let normalizer = log_sum_exp(last);
        let confidence = if normalizer.is_finite() && log_score.is_finite() {
            (log_score - normalizer).exp()
        } else {
            0.0
        };

        let mut states = vec![0usize; t_len];
        states[t_len - 1] = state;
        for t in (1..t_len).rev() {
            state = psi[t * n + state];
            states[t - 1] = state;
        }

        debug!(log_score, confidence, final_state = states[t_len - 1], "viterbi done");

        Ok(ViterbiPath {
            states,
            log_score,
            confidence,
        })
    }
}

fn check_observations<R: AsRef<[f64]>>(
    model: &GaussianHmm,
    observations: &[R],
) -> Result<(), HmmError> {
    if observations.is_empty() {
        return Err(HmmError::EmptySequence);
    }
    let dim = model.dim();
    for (time, row) in observations.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != dim {
            return Err(HmmError::DimensionMismatch {
                time,
                expected: dim,
                got: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(HmmError::NonFiniteObservation { time });
        }
    }
    Ok(())
}

/// Decode with the default floor; returns one label per observation.
pub fn decode<R: AsRef<[f64]>>(
    model: &GaussianHmm,
    observations: &[R],
) -> Result<Vec<String>, HmmError> {
    ViterbiDecoder::default().decode(model, observations)
}
