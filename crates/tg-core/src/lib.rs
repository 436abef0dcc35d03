//! TrendGuard core library
//!
//! - Gaussian HMM definition and Viterbi decoding (`hmm`)
//! - Lifecycle analysis and decline detection over decoded paths
//! - Model loading, observation input, output rendering
//! - Exit codes and logging for the `trendguard` binary
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod exit_codes;
pub mod hmm;
pub mod input;
pub mod lifecycle;
pub mod logging;
pub mod output;
pub mod schema;

pub use hmm::{decode, ErrorKind, GaussianHmm, HmmError, ViterbiDecoder, ViterbiPath};
pub use lifecycle::{analyze_trend, AnalysisSummary, DeclineDetector, LifecycleReport};
