//! JSON Schema generation for model files and CLI output types.
//!
//! ```bash
//! trendguard config schema                 # every schema, keyed by name
//! trendguard config schema LifecycleReport # one schema
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::lifecycle::{
    AnalysisSummary, DeclinePoint, LifecycleReport, PhaseSegment, PhaseTransition, SkippedTrend,
};
pub use crate::output::DecodedTrend;
pub use tg_config::{ConfigSnapshot, ModelConfig};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Input
        ("ModelConfig", "Model file: states, transitions, emissions"),
        // Provenance
        ("ConfigSnapshot", "Which model produced a result"),
        // Output
        ("DecodedTrend", "Decoded state path of one trend"),
        ("LifecycleReport", "Lifecycle analysis of one trend"),
        ("AnalysisSummary", "Lifecycle analysis over all trends"),
        ("DeclinePoint", "First point in a terminal phase"),
        ("PhaseSegment", "Maximal run of one phase"),
        ("PhaseTransition", "Change from one phase to the next"),
        ("SkippedTrend", "Trend excluded from analysis"),
    ]
}

/// Generate JSON Schema for a type by name.
///
/// Returns `None` if the type is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "ModelConfig" => schema_for!(ModelConfig),
        "ConfigSnapshot" => schema_for!(ConfigSnapshot),
        "DecodedTrend" => schema_for!(DecodedTrend),
        "LifecycleReport" => schema_for!(LifecycleReport),
        "AnalysisSummary" => schema_for!(AnalysisSummary),
        "DeclinePoint" => schema_for!(DeclinePoint),
        "PhaseSegment" => schema_for!(PhaseSegment),
        "PhaseTransition" => schema_for!(PhaseTransition),
        "SkippedTrend" => schema_for!(SkippedTrend),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    let mut schemas = BTreeMap::new();
    for (name, _desc) in available_schemas() {
        if let Some(schema) = generate_schema(name) {
            schemas.insert(name.to_string(), schema);
        }
    }
    schemas
}
