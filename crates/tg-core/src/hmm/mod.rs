//! Gaussian hidden Markov model and Viterbi decoding.
//!
//! - [`GaussianHmm`]: validated, immutable model definition
//! - emission evaluation on the model (`emission_density`, `log_emission_density`)
//! - [`ViterbiDecoder`] / [`decode`]: most likely state path
//!
//! A model is `Send + Sync`; decode calls share nothing but the model, so one
//! `Arc<GaussianHmm>` can serve any number of threads.

mod emission;
pub mod error;
pub mod model;
pub mod viterbi;

pub use error::{ErrorKind, HmmError};
pub use model::{GaussianHmm, PROBABILITY_TOLERANCE, SYMMETRY_TOLERANCE};
pub use viterbi::{decode, ViterbiDecoder, ViterbiPath};
