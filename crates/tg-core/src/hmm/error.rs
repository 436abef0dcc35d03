//! Error types for model construction and decoding.

use serde::Serialize;
use thiserror::Error;

/// Coarse error category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Parameter shapes disagree with the number of states or features.
    Configuration,
    /// Values are well-shaped but unacceptable (probabilities, covariances,
    /// observations).
    Value,
    /// A state index beyond the model.
    OutOfRange,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Value => write!(f, "value"),
            ErrorKind::OutOfRange => write!(f, "out_of_range"),
        }
    }
}

/// Errors from building a [`GaussianHmm`](super::GaussianHmm) or decoding with it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HmmError {
    #[error("{dimension}: expected {expected}, got {got}")]
    Configuration {
        dimension: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate state label '{label}' at index {index}")]
    DuplicateState { label: String, index: usize },

    #[error("model needs at least one state and one feature dimension")]
    EmptyModel,

    #[error("invalid probabilities in {what}: {reason}")]
    InvalidProbability { what: String, reason: String },

    #[error("non-finite value in {what}")]
    NonFiniteParameter { what: String },

    #[error("invalid covariance for state {state}: {reason}")]
    InvalidCovariance { state: usize, reason: String },

    #[error("observation sequence is empty")]
    EmptySequence,

    #[error("observation {time} has {got} features, expected {expected}")]
    DimensionMismatch {
        time: usize,
        expected: usize,
        got: usize,
    },

    #[error("observation has {got} features, expected {expected}")]
    ObservationLength { expected: usize, got: usize },

    #[error("observation {time} contains a non-finite value")]
    NonFiniteObservation { time: usize },

    #[error("state index {index} out of range for {n_states} states")]
    StateOutOfRange { index: usize, n_states: usize },
}

impl HmmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HmmError::Configuration { .. } | HmmError::DuplicateState { .. } | HmmError::EmptyModel => {
                ErrorKind::Configuration
            }
            HmmError::InvalidProbability { .. }
            | HmmError::NonFiniteParameter { .. }
            | HmmError::InvalidCovariance { .. }
            | HmmError::EmptySequence
            | HmmError::DimensionMismatch { .. }
            | HmmError::ObservationLength { .. }
            | HmmError::NonFiniteObservation { .. } => ErrorKind::Value,
            HmmError::StateOutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }

    /// True when the error is about the observations rather than the model.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            HmmError::EmptySequence
                | HmmError::DimensionMismatch { .. }
                | HmmError::ObservationLength { .. }
                | HmmError::NonFiniteObservation { .. }
        )
    }

    pub(crate) fn shape(dimension: impl Into<String>, expected: usize, got: usize) -> Self {
        HmmError::Configuration {
            dimension: dimension.into(),
            expected,
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(HmmError::EmptyModel.kind(), ErrorKind::Configuration);
        assert_eq!(HmmError::shape("initial", 3, 2).kind(), ErrorKind::Configuration);
        assert_eq!(HmmError::EmptySequence.kind(), ErrorKind::Value);
        assert_eq!(
            HmmError::StateOutOfRange {
                index: 7,
                n_states: 5
            }
            .kind(),
            ErrorKind::OutOfRange
        );
    }

    #[test]
    fn test_message_names_dimension() {
        let err = HmmError::shape("transition row 2 columns", 5, 4);
        assert_eq!(err.to_string(), "transition row 2 columns: expected 5, got 4");
    }

    #[test]
    fn test_input_errors() {
        assert!(HmmError::NonFiniteObservation { time: 3 }.is_input_error());
        assert!(!HmmError::EmptyModel.is_input_error());
    }
}
