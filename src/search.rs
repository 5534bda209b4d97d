//! Exhaustive nearest-template search
//!
//! A single ordered pass over the library. Distance is the popcount of the
//! word-wise XOR between observation and template; the running minimum only
//! moves on a strictly smaller distance, so the first template reaching the
//! minimum wins.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bits::{hamming_words, BitVector};
use crate::library::TemplateLibrary;
use crate::FitError;

/// Outcome of one search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
    /// Index of the winning template in library order
    pub index: usize,
    /// Hamming distance to it, in [0, nbits]
    pub distance: u32,
}

/// Find the library template closest to `observation`.
///
/// Fails with [`FitError::EmptyLibrary`] if there is nothing to match, and with
/// [`FitError::WidthMismatch`] if the observation was sampled at a different
/// bit width than the library.
pub fn best_match(observation: &BitVector, library: &TemplateLibrary) -> Result<MatchResult, FitError> {
    if library.is_empty() {
        return Err(FitError::EmptyLibrary);
    }
    if observation.len() != library.nbits() {
        return Err(FitError::WidthMismatch {
            context: "observation",
            expected: library.nbits(),
            got: observation.len(),
        });
    }

    let words = observation.words();
    let mut best = MatchResult {
        index: 0,
        distance: u32::MAX,
    };

    for (imodel, template) in library.iter().enumerate() {
        let distance = hamming_words(words, template.bits().words());
        if distance < best.distance {
            best = MatchResult {
                index: imodel,
                distance,
            };
            if distance == 0 {
                break;
            }
        }
    }

    Ok(best)
}

/// [`best_match`] for many observations at once, spread over the rayon pool.
///
/// Results come back in observation order.
pub fn best_match_batch(
    observations: &[BitVector],
    library: &TemplateLibrary,
) -> Result<Vec<MatchResult>, FitError> {
    observations
        .par_iter()
        .map(|observation| best_match(observation, library))
        .collect()
}
