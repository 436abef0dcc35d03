//! Fuzz target for Viterbi decoding.
//!
//! Decodes arbitrary observation matrices against the five-state preset.
//! Shape and finiteness errors are expected; panics are not.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tg_core::hmm::{GaussianHmm, ViterbiDecoder};

#[derive(Debug, Arbitrary)]
struct DecodeInput {
    observations: Vec<Vec<f64>>,
    zero_floor: bool,
}

fuzz_target!(|input: DecodeInput| {
    let Ok(model) = GaussianHmm::five_state_lifecycle() else {
        return;
    };
    let decoder = if input.zero_floor {
        ViterbiDecoder::with_epsilon(0.0).unwrap_or_default()
    } else {
        ViterbiDecoder::default()
    };
    if let Ok(path) = decoder.decode_path(&model, &input.observations) {
        assert_eq!(path.len(), input.observations.len());
        assert!(path.states.iter().all(|&s| s < model.n_states()));
    }
});
