//! Model loading for the CLI.
//!
//! This module handles:
//! - Resolving where the model comes from (file, preset, builtin default)
//! - Reading and parsing model.json with path-aware errors
//! - Schema-level validation followed by model construction
//! - Config snapshot generation for reports

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

pub use tg_config::preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use tg_config::validate::ValidationError;
pub use tg_config::{ConfigSnapshot, ConfigSource, ModelConfig};

use tg_config::resolve::resolve_model_path;
use tg_config::validate::validate_model_config;

use crate::hmm::{GaussianHmm, HmmError};

/// Errors that can occur while loading a model.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Model file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in model file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Invalid model: {0}")]
    Model(#[from] HmmError),
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::NotFound { .. } => 50,
            ConfigError::ParseError { .. } => 51,
            ConfigError::IoError { .. } => 52,
            ConfigError::ValidationError(e) => e.code(),
            ConfigError::Model(_) => 70,
        }
    }
}

/// Model resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit model file (highest priority).
    pub model_path: Option<PathBuf>,
    /// Directory holding model.json.
    pub config_dir: Option<PathBuf>,
    /// Preset used when no model file is found.
    pub preset: Option<PresetName>,
}

/// A ready-to-use model with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    pub config: ModelConfig,
    pub model: GaussianHmm,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
    pub snapshot: ConfigSnapshot,
}

/// Resolve, load, validate, and build the model.
///
/// Order: `--model` → TRENDGUARD_MODEL → config dir → XDG → /etc →
/// `--preset` → five_state_lifecycle.
pub fn load_model(options: &ConfigOptions) -> Result<ResolvedModel, ConfigError> {
    match resolve_model_path(options.model_path.as_deref(), options.config_dir.as_deref()) {
        Some(found) => {
            debug!(path = %found.path.display(), source = %found.source, "model file resolved");
            let (config, raw) = read_model_file(&found.path)?;
            let model = build_model(&config)?;
            let snapshot = ConfigSnapshot::new(&config, &found.source, Some(&found.path), Some(&raw));
            info!(source = %found.source, model_hash = snapshot.short_id(), "model loaded");
            Ok(ResolvedModel {
                config,
                model,
                source: found.source,
                path: Some(found.path),
                snapshot,
            })
        }
        None => {
            let (name, source) = match options.preset {
                Some(name) => (name, ConfigSource::Preset),
                None => (PresetName::FiveStateLifecycle, ConfigSource::BuiltinDefault),
            };
            from_preset(name, source)
        }
    }
}

/// Build a resolved model from a built-in preset.
pub fn from_preset(name: PresetName, source: ConfigSource) -> Result<ResolvedModel, ConfigError> {
    let config = get_preset(name);
    let model = build_model(&config)?;
    let snapshot = ConfigSnapshot::new(&config, &source, None, None);
    debug!(preset = %name, source = %source, "using preset model");
    Ok(ResolvedModel {
        config,
        model,
        source,
        path: None,
        snapshot,
    })
}

/// Read and parse a model file, returning the raw text for hashing.
pub fn read_model_file(path: &Path) -> Result<(ModelConfig, String), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: ModelConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok((config, content))
}

/// Schema-level validation, then full model construction.
pub fn build_model(config: &ModelConfig) -> Result<GaussianHmm, ConfigError> {
    validate_model_config(config)?;
    Ok(GaussianHmm::from_config(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("test")
            .join("fixtures")
            .join("config")
    }

    #[test]
    fn test_explicit_model_file() {
        let options = ConfigOptions {
            model_path: Some(fixtures_dir().join("valid_model.json")),
            ..Default::default()
        };
        let resolved = load_model(&options).unwrap();
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(resolved.model.states(), &["Growth", "Decline"]);
        assert_eq!(resolved.model.feature_name(0), "velocity");
        assert!(resolved.snapshot.model_path.is_some());
    }

    #[test]
    fn test_missing_explicit_file() {
        let options = ConfigOptions {
            model_path: Some(fixtures_dir().join("nope.json")),
            ..Default::default()
        };
        let err = load_model(&options).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        assert_eq!(err.code(), 50);
    }

    #[test]
    fn test_bad_row_sum_fails_model_build() {
        let options = ConfigOptions {
            model_path: Some(fixtures_dir().join("invalid_model_bad_row_sum.json")),
            ..Default::default()
        };
        let err = load_model(&options).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Model(HmmError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_duplicate_state_fails_validation() {
        let (config, _) =
            read_model_file(&fixtures_dir().join("invalid_model_duplicate_state.json")).unwrap();
        let err = build_model(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn test_preset_models_build() {
        for &name in PresetName::ALL {
            let resolved = from_preset(name, ConfigSource::Preset).unwrap();
            assert_eq!(resolved.model.n_states(), resolved.config.n_states());
            assert!(resolved.path.is_none());
        }
    }
}
