//! Observation input files.
//!
//! Accepted JSON shapes:
//! - a bare matrix: `[[v, f, r], ...]`
//! - one trend: `{"name": "...", "observations": [[...], ...]}`
//! - several: `{"trends": [{"name": ..., "observations": ...}, ...]}`
//!
//! A path of `-` reads stdin.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors reading observation input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid observation JSON in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Input contains no trends")]
    Empty,
}

/// A named observation sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trend {
    #[serde(default)]
    pub name: Option<String>,
    pub observations: Vec<Vec<f64>>,
}

impl Trend {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Matrix(Vec<Vec<f64>>),
    Batch { trends: Vec<Trend> },
    Single(Trend),
}

/// Parse observation JSON. Unnamed trends get `trend-{i}` names.
pub fn parse_trends(json: &str, origin: &str) -> Result<Vec<Trend>, InputError> {
    let raw: RawInput = serde_json::from_str(json).map_err(|e| InputError::Parse {
        origin: origin.to_string(),
        source: e,
    })?;

    let mut trends = match raw {
        RawInput::Matrix(observations) => vec![Trend {
            name: None,
            observations,
        }],
        RawInput::Batch { trends } => trends,
        RawInput::Single(trend) => vec![trend],
    };

    if trends.is_empty() {
        return Err(InputError::Empty);
    }

    for (i, trend) in trends.iter_mut().enumerate() {
        if trend.name.is_none() {
            trend.name = Some(format!("trend-{}", i));
        }
    }
    Ok(trends)
}

/// Read and parse an observation file, or stdin for `-`.
pub fn load_trends(path: &Path) -> Result<Vec<Trend>, InputError> {
    let mut content = String::new();
    let origin = if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| InputError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        "stdin".to_string()
    } else {
        content = std::fs::read_to_string(path).map_err(|e| InputError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        path.display().to_string()
    };
    parse_trends(&content, &origin)
}
