//! Lifecycle model configuration types.
//!
//! These types match model.json. Shapes and probability invariants are not
//! checked here; the core model constructor owns those checks so that there is
//! a single place that decides whether a model is decodable.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Complete model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelConfig {
    pub schema_version: String,

    /// Short identifier, e.g. the preset it came from.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// State labels in lifecycle order.
    pub states: Vec<String>,

    /// Names of the observation features, one per emission dimension.
    #[serde(default)]
    pub feature_names: Vec<String>,

    /// Row-stochastic transition matrix; row i = outgoing from state i.
    pub transition: Vec<Vec<f64>>,

    /// Initial state distribution.
    pub initial: Vec<f64>,

    /// Per-state Gaussian emission parameters, in state order.
    pub emissions: Vec<EmissionParams>,

    /// Labels that mark a decline when first reached.
    #[serde(default)]
    pub terminal_states: Vec<String>,
}

/// Gaussian emission parameters for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmissionParams {
    pub mean: Vec<f64>,
    pub covariance: CovarianceSpec,

    #[serde(rename = "_comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl EmissionParams {
    pub fn new(mean: Vec<f64>, covariance: CovarianceSpec) -> Self {
        Self {
            mean,
            covariance,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// Full covariance rows, expanded to the mean's dimension.
    pub fn covariance_rows(&self) -> Vec<Vec<f64>> {
        self.covariance.to_rows(self.mean.len())
    }
}

/// Covariance, written in full or in one of the diagonal shorthands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceSpec {
    /// Explicit D×D matrix.
    Full(Vec<Vec<f64>>),
    /// Per-dimension variances; off-diagonal entries are zero.
    Diagonal(Vec<f64>),
    /// One variance shared by every dimension (`v·I`).
    Isotropic(f64),
}

impl CovarianceSpec {
    /// Expand to nested rows. `dim` is only used by the isotropic form.
    pub fn to_rows(&self, dim: usize) -> Vec<Vec<f64>> {
        match self {
            CovarianceSpec::Full(rows) => rows.clone(),
            CovarianceSpec::Diagonal(diag) => diagonal_rows(diag),
            CovarianceSpec::Isotropic(v) => diagonal_rows(&vec![*v; dim]),
        }
    }
}

fn diagonal_rows(diag: &[f64]) -> Vec<Vec<f64>> {
    let n = diag.len();
    (0..n)
        .map(|i| {
            let mut row = vec![0.0; n];
            row[i] = diag[i];
            row
        })
        .collect()
}

impl ModelConfig {
    /// Load a model config from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse a model config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// Emission dimension, taken from the first state's mean.
    pub fn dim(&self) -> Option<usize> {
        self.emissions.first().map(|e| e.mean.len())
    }

    /// Emission means in state order.
    pub fn means(&self) -> Vec<Vec<f64>> {
        self.emissions.iter().map(|e| e.mean.clone()).collect()
    }

    /// Expanded emission covariances in state order.
    pub fn covariances(&self) -> Vec<Vec<Vec<f64>>> {
        self.emissions.iter().map(|e| e.covariance_rows()).collect()
    }

    /// Feature name for dimension `d`, falling back to `x{d}`.
    pub fn feature_name(&self, d: usize) -> String {
        self.feature_names
            .get(d)
            .cloned()
            .unwrap_or_else(|| format!("x{}", d))
    }
}
