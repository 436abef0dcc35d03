//! Built-in model presets.
//!
//! Provides ready-made lifecycle models:
//! - FiveStateLifecycle: Emerging → Growth → Peak → Saturation → Decline
//! - ThreeStateDefault: Growth → Saturation → Decline, the compact fallback

use crate::model::{CovarianceSpec, EmissionParams, ModelConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Feature order shared by the built-in presets.
pub const DEFAULT_FEATURES: [&str; 3] = ["velocity", "fatigue", "retention"];

/// Available model presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetName {
    /// Five lifecycle phases with a mostly-forward transition matrix
    FiveStateLifecycle,
    /// Three phases with an absorbing decline state
    ThreeStateDefault,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] =
        &[PresetName::FiveStateLifecycle, PresetName::ThreeStateDefault];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::FiveStateLifecycle => "five_state_lifecycle",
            PresetName::ThreeStateDefault => "three_state_default",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "five_state_lifecycle" | "five_state" | "five" | "lifecycle" => {
                Some(PresetName::FiveStateLifecycle)
            }
            "three_state_default" | "three_state" | "three" | "default" => {
                Some(PresetName::ThreeStateDefault)
            }
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::FiveStateLifecycle => {
                "Emerging, Growth, Peak, Saturation, Decline; forward flow with absorbing Decline"
            }
            PresetName::ThreeStateDefault => {
                "Growth, Saturation, Decline; compact fallback with absorbing Decline"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Error, Debug, Clone)]
pub enum PresetError {
    #[error("Unknown preset '{0}'. Available: five_state_lifecycle, three_state_default")]
    UnknownPreset(String),
}

/// Get the model config for a preset.
pub fn get_preset(name: PresetName) -> ModelConfig {
    match name {
        PresetName::FiveStateLifecycle => five_state_lifecycle(),
        PresetName::ThreeStateDefault => three_state_default(),
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Five-phase lifecycle model.
///
/// Tighter covariance means a more distinctive phase; Peak is the tightest,
/// Decline the loosest since declines follow many shapes.
fn five_state_lifecycle() -> ModelConfig {
    ModelConfig {
        schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
        name: Some(PresetName::FiveStateLifecycle.as_str().to_string()),
        description: Some(PresetName::FiveStateLifecycle.description().to_string()),
        states: labels(&["Emerging", "Growth", "Peak", "Saturation", "Decline"]),
        feature_names: labels(&DEFAULT_FEATURES),
        transition: vec![
            vec![0.6, 0.35, 0.05, 0.0, 0.0],
            vec![0.0, 0.5, 0.45, 0.05, 0.0],
            vec![0.0, 0.0, 0.4, 0.5, 0.1],
            vec![0.0, 0.0, 0.0, 0.5, 0.5],
            vec![0.0, 0.0, 0.0, 0.0, 1.0],
        ],
        initial: vec![0.8, 0.2, 0.0, 0.0, 0.0],
        emissions: vec![
            EmissionParams::new(vec![0.3, 0.1, 0.4], CovarianceSpec::Isotropic(0.08))
                .with_comment("low velocity, low fatigue, moderate retention"),
            EmissionParams::new(vec![0.8, 0.2, 0.8], CovarianceSpec::Isotropic(0.05))
                .with_comment("high velocity, low fatigue, high retention"),
            EmissionParams::new(vec![0.9, 0.4, 0.9], CovarianceSpec::Isotropic(0.04))
                .with_comment("maximum velocity, rising fatigue, maximum retention"),
            EmissionParams::new(vec![0.5, 0.6, 0.6], CovarianceSpec::Isotropic(0.08))
                .with_comment("dropping velocity, high fatigue, dropping retention"),
            EmissionParams::new(vec![0.2, 0.8, 0.3], CovarianceSpec::Isotropic(0.10))
                .with_comment("low velocity, very high fatigue, low retention"),
        ],
        terminal_states: labels(&["Saturation", "Decline"]),
    }
}

/// Three-phase fallback model: starts in Growth, Decline is absorbing.
fn three_state_default() -> ModelConfig {
    ModelConfig {
        schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
        name: Some(PresetName::ThreeStateDefault.as_str().to_string()),
        description: Some(PresetName::ThreeStateDefault.description().to_string()),
        states: labels(&["Growth", "Saturation", "Decline"]),
        feature_names: labels(&DEFAULT_FEATURES),
        transition: vec![
            vec![0.8, 0.2, 0.0],
            vec![0.0, 0.7, 0.3],
            vec![0.0, 0.0, 1.0],
        ],
        initial: vec![1.0, 0.0, 0.0],
        emissions: vec![
            EmissionParams::new(vec![0.8, 0.2, 0.8], CovarianceSpec::Isotropic(0.05)),
            EmissionParams::new(vec![0.5, 0.6, 0.6], CovarianceSpec::Isotropic(0.08)),
            EmissionParams::new(vec![0.2, 0.8, 0.3], CovarianceSpec::Isotropic(0.10)),
        ],
        terminal_states: labels(&["Saturation", "Decline"]),
    }
}

/// Summary information about a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
    pub states: Vec<String>,
    pub dimensions: usize,
}

impl PresetInfo {
    /// Create info from a preset.
    pub fn from_preset(name: PresetName) -> Self {
        let config = get_preset(name);
        Self {
            name: name.as_str().to_string(),
            description: name.description().to_string(),
            dimensions: config.dim().unwrap_or(0),
            states: config.states,
        }
    }
}

/// List all available presets with their info.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo::from_preset(name))
        .collect()
}
