//! Configuration snapshots for analysis reports.
//!
//! A snapshot records which model a report was decoded with, so that a
//! classification can be traced back to exact parameters later.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::ModelConfig;
use crate::resolve::ConfigSource;

/// A frozen snapshot of the model configuration in use.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Hostname where snapshot was taken.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 of the model JSON: raw file content when loaded from disk,
    /// canonical serialization otherwise.
    pub model_hash: String,

    /// Path the model was loaded from.
    #[serde(default)]
    pub model_path: Option<String>,

    /// Source of the model configuration.
    pub source: String,

    /// Key model facts for quick reference.
    pub summary: ModelSummary,
}

/// Summary of the model shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelSummary {
    #[serde(default)]
    pub name: Option<String>,
    pub n_states: usize,
    pub dimensions: usize,
    pub states: Vec<String>,
    pub terminal_states: Vec<String>,
}

impl ConfigSnapshot {
    /// Create a snapshot of a loaded model configuration.
    ///
    /// `raw_json` is the file content the config was parsed from, if any.
    pub fn new(
        config: &ModelConfig,
        source: &ConfigSource,
        model_path: Option<&std::path::Path>,
        raw_json: Option<&str>,
    ) -> Self {
        let model_hash = match raw_json {
            Some(raw) => hash_content(raw),
            None => hash_content(&serde_json::to_string(config).unwrap_or_default()),
        };

        ConfigSnapshot {
            timestamp: Utc::now(),
            hostname: hostname::get()
                .ok()
                .map(|h| h.to_string_lossy().to_string()),
            schema_version: config.schema_version.clone(),
            model_hash,
            model_path: model_path.map(|p| p.display().to_string()),
            source: source.to_string(),
            summary: ModelSummary {
                name: config.name.clone(),
                n_states: config.n_states(),
                dimensions: config.dim().unwrap_or(0),
                states: config.states.clone(),
                terminal_states: config.terminal_states.clone(),
            },
        }
    }

    /// Leading 12 hex digits of the model hash, for log lines and summaries.
    pub fn short_id(&self) -> &str {
        self.model_hash.get(..12).unwrap_or(&self.model_hash)
    }
}

/// Lowercase hex SHA-256 of `content`.
pub fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
