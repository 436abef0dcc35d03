//! Fuzz target for model.json parsing and model construction.
//!
//! Arbitrary bytes must either fail to parse, fail validation, or build a
//! model; never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tg_config::{validate_model_config, ModelConfig};
use tg_core::hmm::GaussianHmm;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<ModelConfig>(data) else {
        return;
    };
    if validate_model_config(&config).is_ok() {
        let _ = GaussianHmm::from_config(&config);
    }
});
