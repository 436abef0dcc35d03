//! TrendGuard configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for model.json (lifecycle HMM parameters)
//! - Built-in model presets
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Schema-level validation
//! - Config snapshots for analysis reports

pub mod model;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use model::{CovarianceSpec, EmissionParams, ModelConfig};
pub use preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use resolve::{resolve_model_path, ConfigSource, ModelPath};
pub use snapshot::{hash_content, ConfigSnapshot, ModelSummary};
pub use validate::{validate_model_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
