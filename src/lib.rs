//! Square-wave template fitting
//!
//! Fits a noisy, lossy, binary-sampled observation of a periodic two-level
//! signal to the closest member of an exhaustively enumerated library of
//! square-wave templates, using bitwise Hamming distance.
//!
//! The pieces, leaf first:
//! - [`wave`]: square-wave parameters and their fixed-width bit encoding
//! - [`library`]: the immutable, exhaustively enumerated template library
//! - [`noise`]: efficiency/purity noise driven by an injected uniform draw
//! - [`search`]: exhaustive nearest-template scan
//!
//! [`trial`], [`diagnostics`], [`config`] and [`io`] wrap the core into the
//! Monte Carlo harness used by the `squarewave-fit` binary.

pub mod bits;
pub mod config;
pub mod diagnostics;
pub mod io;
pub mod library;
pub mod noise;
pub mod search;
pub mod trial;
pub mod wave;

use thiserror::Error;

// Re-export main types
pub use bits::BitVector;
pub use config::FitConfig;
pub use diagnostics::{DiagnosticsCollector, DiagnosticsSummary, Histogram};
pub use library::{Template, TemplateLibrary};
pub use noise::{perturb, NoiseModel};
pub use search::{best_match, best_match_batch, MatchResult};
pub use trial::{run_trials, run_trials_parallel, TrialConfig, TrialObserver, TrialRecord, TrialReport};
pub use wave::{encode, square_wave, WaveParams};

/// Sample resolution used by the reference harness.
pub const DEFAULT_NBITS: usize = 36;

#[derive(Debug, Error)]
pub enum FitError {
    #[error(
        "illegal wave parameters for {nbits} bits: wavelength={wavelength}, phase={phase}, width={width}"
    )]
    InvalidParams {
        wavelength: f64,
        phase: f64,
        width: f64,
        nbits: usize,
    },
    #[error("template library is empty")]
    EmptyLibrary,
    #[error("{context} bit width mismatch: expected {expected}, got {got}")]
    WidthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("invalid noise model: {0}")]
    InvalidNoise(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
