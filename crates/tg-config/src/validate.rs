//! Configuration validation errors and schema-level validation.
//!
//! Probability and shape invariants belong to the model constructor in
//! tg-core; this module checks what a config file can get wrong on its own.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::ModelConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Schema validation failed: {0}")]
    SchemaError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SchemaError(_) => 62,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a model configuration at the schema level.
pub fn validate_model_config(config: &ModelConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.states.is_empty() {
        return Err(ValidationError::MissingField("states".to_string()));
    }

    if config.emissions.is_empty() {
        return Err(ValidationError::MissingField("emissions".to_string()));
    }

    let mut seen = HashSet::new();
    for (i, label) in config.states.iter().enumerate() {
        if label.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("states[{}]", i),
                message: "State label must not be empty".to_string(),
            });
        }
        if !seen.insert(label.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: format!("states[{}]", i),
                message: format!("Duplicate state label '{}'", label),
            });
        }
    }

    if !config.feature_names.is_empty() {
        if let Some(dim) = config.dim() {
            if config.feature_names.len() != dim {
                return Err(ValidationError::SchemaError(format!(
                    "feature_names has {} entries but emission means have dimension {}",
                    config.feature_names.len(),
                    dim
                )));
            }
        }
    }

    for (i, terminal) in config.terminal_states.iter().enumerate() {
        if !seen.contains(terminal.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: format!("terminal_states[{}]", i),
                message: format!("Unknown state label '{}'", terminal),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{get_preset, PresetName};

    #[test]
    fn test_presets_validate() {
        for &name in PresetName::ALL {
            validate_model_config(&get_preset(name)).unwrap();
        }
    }

    #[test]
    fn test_version_mismatch() {
        let mut config = get_preset(PresetName::ThreeStateDefault);
        config.schema_version = "0.9.0".to_string();
        let err = validate_model_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn test_duplicate_label() {
        let mut config = get_preset(PresetName::ThreeStateDefault);
        config.states[2] = "Growth".to_string();
        let err = validate_model_config(&config).unwrap_err();
        match err {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "states[2]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_terminal_state() {
        let mut config = get_preset(PresetName::FiveStateLifecycle);
        config.terminal_states.push("Collapse".to_string());
        let err = validate_model_config(&config).unwrap_err();
        assert!(err.to_string().contains("Collapse"));
    }

    #[test]
    fn test_feature_names_length() {
        let mut config = get_preset(PresetName::FiveStateLifecycle);
        config.feature_names.pop();
        let err = validate_model_config(&config).unwrap_err();
        assert_eq!(err.code(), 62);
    }

    #[test]
    fn test_empty_states() {
        let mut config = get_preset(PresetName::ThreeStateDefault);
        config.states.clear();
        assert_eq!(
            validate_model_config(&config),
            Err(ValidationError::MissingField("states".to_string()))
        );
    }
}
