//! Validated Gaussian HMM definition.
//!
//! A [`GaussianHmm`] is checked once at construction and immutable after that,
//! so decoding never re-validates parameters. Covariances are regularized and
//! factored up front; every later density evaluation reuses the factor.

use std::collections::HashSet;

use tg_config::{get_preset, ModelConfig, PresetName};
use tg_math::{Matrix, MultivariateNormal};

use super::emission::build_emissions;
use super::error::HmmError;

/// Allowed deviation of a probability vector's sum from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Relative tolerance for covariance symmetry.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Hidden Markov model with multivariate Gaussian emissions.
#[derive(Debug, Clone)]
pub struct GaussianHmm {
    states: Vec<String>,
    transition: Matrix,
    initial: Vec<f64>,
    pub(super) emissions: Vec<MultivariateNormal>,
    feature_names: Vec<String>,
    dim: usize,
}

impl GaussianHmm {
    /// Build and validate a model.
    ///
    /// `transition[i][j]` is P(state j at t+1 | state i at t). Shape problems
    /// are reported as [`HmmError::Configuration`] naming the offending
    /// dimension; bad values as the value-kind variants.
    pub fn new<S: Into<String>>(
        states: Vec<S>,
        transition: Vec<Vec<f64>>,
        initial: Vec<f64>,
        emission_means: Vec<Vec<f64>>,
        emission_covariances: Vec<Vec<Vec<f64>>>,
    ) -> Result<Self, HmmError> {
        let states: Vec<String> = states.into_iter().map(Into::into).collect();
        let n = states.len();
        if n == 0 {
            return Err(HmmError::EmptyModel);
        }

        let mut seen = HashSet::with_capacity(n);
        for (index, label) in states.iter().enumerate() {
            if !seen.insert(label.as_str()) {
                return Err(HmmError::DuplicateState {
                    label: label.clone(),
                    index,
                });
            }
        }

        check_shapes(n, &transition, &initial, &emission_means, &emission_covariances)?;
        let dim = emission_means[0].len();

        if transition.iter().flatten().any(|v| !v.is_finite()) {
            return Err(HmmError::NonFiniteParameter {
                what: "transition".to_string(),
            });
        }
        if initial.iter().any(|v| !v.is_finite()) {
            return Err(HmmError::NonFiniteParameter {
                what: "initial".to_string(),
            });
        }
        for (i, mean) in emission_means.iter().enumerate() {
            if mean.iter().any(|v| !v.is_finite()) {
                return Err(HmmError::NonFiniteParameter {
                    what: format!("emission mean {}", i),
                });
            }
        }
        for (i, cov) in emission_covariances.iter().enumerate() {
            if cov.iter().flatten().any(|v| !v.is_finite()) {
                return Err(HmmError::NonFiniteParameter {
                    what: format!("emission covariance {}", i),
                });
            }
        }

        for (i, row) in transition.iter().enumerate() {
            check_distribution(&format!("transition row {}", i), row)?;
        }
        check_distribution("initial", &initial)?;

        let emissions = build_emissions(emission_means, &emission_covariances)?;
        let transition = Matrix::from_rows(&transition)
            .map_err(|_| HmmError::shape("transition rows", n, transition.len()))?;

        Ok(Self {
            states,
            transition,
            initial,
            emissions,
            feature_names: Vec::new(),
            dim,
        })
    }

    /// Build from a parsed model config.
    ///
    /// Feature names are carried over; terminal states are a lifecycle concern
    /// and stay on the config.
    pub fn from_config(config: &ModelConfig) -> Result<Self, HmmError> {
        let model = Self::new(
            config.states.clone(),
            config.transition.clone(),
            config.initial.clone(),
            config.means(),
            config.covariances(),
        )?;
        Ok(model.with_feature_names(config.feature_names.clone()))
    }

    /// Emerging → Growth → Peak → Saturation → Decline over
    /// (velocity, fatigue, retention).
    pub fn five_state_lifecycle() -> Result<Self, HmmError> {
        Self::from_config(&get_preset(PresetName::FiveStateLifecycle))
    }

    /// Growth → Saturation → Decline with an absorbing Decline state.
    pub fn three_state_default() -> Result<Self, HmmError> {
        Self::from_config(&get_preset(PresetName::ThreeStateDefault))
    }

    /// Attach feature names. Names are informational; a count that differs
    /// from the emission dimension is ignored past the shorter length.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// Observation dimension D.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn transition(&self) -> &Matrix {
        &self.transition
    }

    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// Name of feature `d`, or `x{d}` when unnamed.
    pub fn feature_name(&self, d: usize) -> String {
        self.feature_names
            .get(d)
            .cloned()
            .unwrap_or_else(|| format!("x{}", d))
    }

    pub fn feature_names(&self) -> Vec<String> {
        (0..self.dim).map(|d| self.feature_name(d)).collect()
    }

    pub fn state_label(&self, index: usize) -> Result<&str, HmmError> {
        self.states
            .get(index)
            .map(String::as_str)
            .ok_or(HmmError::StateOutOfRange {
                index,
                n_states: self.states.len(),
            })
    }

    pub fn state_index(&self, label: &str) -> Option<usize> {
        self.states.iter().position(|s| s == label)
    }

    pub(crate) fn check_state(&self, index: usize) -> Result<(), HmmError> {
        if index < self.states.len() {
            Ok(())
        } else {
            Err(HmmError::StateOutOfRange {
                index,
                n_states: self.states.len(),
            })
        }
    }

    /// A state is absorbing when it never transitions elsewhere.
    pub fn is_absorbing(&self, index: usize) -> Result<bool, HmmError> {
        self.check_state(index)?;
        Ok(self
            .transition
            .row(index)
            .iter()
            .enumerate()
            .all(|(j, &p)| j == index || p == 0.0))
    }

    pub fn absorbing_states(&self) -> Vec<usize> {
        (0..self.n_states())
            .filter(|&i| self.is_absorbing(i).unwrap_or(false))
            .collect()
    }

    /// True when the transition matrix is upper triangular, so the state
    /// index can never decrease along a path with nonzero probability.
    pub fn is_forward_only(&self) -> bool {
        (0..self.n_states()).all(|i| (0..i).all(|j| self.transition.get(i, j) == 0.0))
    }
}

fn check_shapes(
    n: usize,
    transition: &[Vec<f64>],
    initial: &[f64],
    means: &[Vec<f64>],
    covariances: &[Vec<Vec<f64>>],
) -> Result<(), HmmError> {
    if transition.len() != n {
        return Err(HmmError::shape("transition rows", n, transition.len()));
    }
    for (i, row) in transition.iter().enumerate() {
        if row.len() != n {
            return Err(HmmError::shape(
                format!("transition row {} columns", i),
                n,
                row.len(),
            ));
        }
    }
    if initial.len() != n {
        return Err(HmmError::shape("initial", n, initial.len()));
    }
    if means.len() != n {
        return Err(HmmError::shape("emission means", n, means.len()));
    }
    if covariances.len() != n {
        return Err(HmmError::shape("emission covariances", n, covariances.len()));
    }

    let dim = means[0].len();
    if dim == 0 {
        return Err(HmmError::EmptyModel);
    }
    for (i, mean) in means.iter().enumerate() {
        if mean.len() != dim {
            return Err(HmmError::shape(
                format!("emission mean {} dimension", i),
                dim,
                mean.len(),
            ));
        }
    }
    for (i, cov) in covariances.iter().enumerate() {
        if cov.len() != dim {
            return Err(HmmError::shape(
                format!("emission covariance {} rows", i),
                dim,
                cov.len(),
            ));
        }
        for row in cov {
            if row.len() != dim {
                return Err(HmmError::shape(
                    format!("emission covariance {} columns", i),
                    dim,
                    row.len(),
                ));
            }
        }
    }
    Ok(())
}

fn check_distribution(what: &str, probs: &[f64]) -> Result<(), HmmError> {
    if let Some((j, p)) = probs.iter().enumerate().find(|(_, &p)| p < 0.0) {
        return Err(HmmError::InvalidProbability {
            what: what.to_string(),
            reason: format!("entry {} is negative ({})", j, p),
        });
    }
    let sum: f64 = probs.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(HmmError::InvalidProbability {
            what: what.to_string(),
            reason: format!("sums to {}, expected 1", sum),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::ErrorKind;

    fn eye(d: usize, v: f64) -> Vec<Vec<f64>> {
        (0..d)
            .map(|i| (0..d).map(|j| if i == j { v } else { 0.0 }).collect())
            .collect()
    }

    fn two_state() -> Result<GaussianHmm, HmmError> {
        GaussianHmm::new(
            vec!["A", "B"],
            vec![vec![0.9, 0.1], vec![0.0, 1.0]],
            vec![1.0, 0.0],
            vec![vec![0.0, 0.0], vec![1.0, 1.0]],
            vec![eye(2, 0.1), eye(2, 0.1)],
        )
    }

    #[test]
    fn test_valid_model() {
        let model = two_state().unwrap();
        assert_eq!(model.n_states(), 2);
        assert_eq!(model.dim(), 2);
        assert_eq!(model.state_label(1).unwrap(), "B");
        assert_eq!(model.state_index("A"), Some(0));
        assert_eq!(model.state_index("Z"), None);
        assert!(model.is_absorbing(1).unwrap());
        assert!(!model.is_absorbing(0).unwrap());
        assert!(model.is_forward_only());
        assert_eq!(model.absorbing_states(), vec![1]);
    }

    #[test]
    fn test_state_label_out_of_range() {
        let model = two_state().unwrap();
        let err = model.state_label(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert!(model.is_absorbing(5).is_err());
    }

    #[test]
    fn test_transition_row_count_mismatch() {
        let err = GaussianHmm::new(
            vec!["A", "B"],
            vec![vec![1.0, 0.0]],
            vec![1.0, 0.0],
            vec![vec![0.0], vec![1.0]],
            vec![eye(1, 0.1), eye(1, 0.1)],
        )
        .unwrap_err();
        assert_eq!(err, HmmError::shape("transition rows", 2, 1));
    }

    #[test]
    fn test_covariance_column_mismatch() {
        let err = GaussianHmm::new(
            vec!["A", "B"],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![0.5, 0.5],
            vec![vec![0.0, 0.0], vec![1.0, 1.0]],
            vec![eye(2, 0.1), vec![vec![0.1, 0.0], vec![0.0]]],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("emission covariance 1 columns"));
    }

    #[test]
    fn test_mean_dimension_mismatch() {
        let err = GaussianHmm::new(
            vec!["A", "B"],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![0.5, 0.5],
            vec![vec![0.0, 0.0], vec![1.0]],
            vec![eye(2, 0.1), eye(2, 0.1)],
        )
        .unwrap_err();
        assert_eq!(err, HmmError::shape("emission mean 1 dimension", 2, 1));
    }

    #[test]
    fn test_row_sum_rejected() {
        let err = GaussianHmm::new(
            vec!["A", "B"],
            vec![vec![0.9, 0.2], vec![0.0, 1.0]],
            vec![1.0, 0.0],
            vec![vec![0.0], vec![1.0]],
            vec![eye(1, 0.1), eye(1, 0.1)],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(matches!(err, HmmError::InvalidProbability { ref what, .. } if what == "transition row 0"));
    }

    #[test]
    fn test_row_sum_within_tolerance() {
        GaussianHmm::new(
            vec!["A"],
            vec![vec![1.0 + 5e-7]],
            vec![1.0 - 5e-7],
            vec![vec![0.0]],
            vec![eye(1, 0.1)],
        )
        .unwrap();
    }

    #[test]
    fn test_negative_probability_rejected() {
        let err = GaussianHmm::new(
            vec!["A", "B"],
            vec![vec![1.2, -0.2], vec![0.0, 1.0]],
            vec![1.0, 0.0],
            vec![vec![0.0], vec![1.0]],
            vec![eye(1, 0.1), eye(1, 0.1)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_initial_sum_rejected() {
        let err = GaussianHmm::new(
            vec!["A", "B"],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![0.3, 0.3],
            vec![vec![0.0], vec![1.0]],
            vec![eye(1, 0.1), eye(1, 0.1)],
        )
        .unwrap_err();
        assert!(matches!(err, HmmError::InvalidProbability { ref what, .. } if what == "initial"));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let err = GaussianHmm::new(
            vec!["A", "A"],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![0.5, 0.5],
            vec![vec![0.0], vec![1.0]],
            vec![eye(1, 0.1), eye(1, 0.1)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            HmmError::DuplicateState {
                label: "A".to_string(),
                index: 1
            }
        );
    }

    #[test]
    fn test_empty_model_rejected() {
        let err = GaussianHmm::new(
            Vec::<String>::new(),
            vec![],
            vec![],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, HmmError::EmptyModel);

        let err = GaussianHmm::new(vec!["A"], vec![vec![1.0]], vec![1.0], vec![vec![]], vec![vec![]])
            .unwrap_err();
        assert_eq!(err, HmmError::EmptyModel);
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = GaussianHmm::new(
            vec!["A"],
            vec![vec![1.0]],
            vec![1.0],
            vec![vec![f64::NAN]],
            vec![eye(1, 0.1)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            HmmError::NonFiniteParameter {
                what: "emission mean 0".to_string()
            }
        );
    }

    #[test]
    fn test_named_factories() {
        let five = GaussianHmm::five_state_lifecycle().unwrap();
        assert_eq!(
            five.states(),
            &["Emerging", "Growth", "Peak", "Saturation", "Decline"]
        );
        assert_eq!(five.feature_name(1), "fatigue");
        assert!(five.is_absorbing(4).unwrap());
        assert!(five.is_forward_only());

        let three = GaussianHmm::three_state_default().unwrap();
        assert_eq!(three.states(), &["Growth", "Saturation", "Decline"]);
        assert_eq!(three.initial(), &[1.0, 0.0, 0.0]);
        assert!(three.is_absorbing(2).unwrap());
    }

    #[test]
    fn test_feature_name_fallback() {
        let model = two_state().unwrap();
        assert_eq!(model.feature_names(), vec!["x0".to_string(), "x1".to_string()]);
    }

    #[test]
    fn test_model_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GaussianHmm>();
    }
}
