//! Efficiency/purity noise model
//!
//! Signal bits survive with probability `efficiency`; background bits are
//! spuriously raised with probability `1 - purity`. Randomness comes in as a
//! uniform draw closure, one draw per bit in index order, so a seeded stream
//! always yields the same observation.

use serde::{Deserialize, Serialize};

use crate::bits::BitVector;
use crate::FitError;

/// Noise parameters for one observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Probability a signal bit is kept
    pub efficiency: f64,
    /// Probability a background bit stays clear
    pub purity: f64,
}

impl NoiseModel {
    pub fn new(efficiency: f64, purity: f64) -> Self {
        Self { efficiency, purity }
    }

    /// Noise-free model
    pub fn ideal() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Both probabilities must lie in [0, 1]
    pub fn check(&self) -> Result<(), FitError> {
        for (name, value) in [("efficiency", self.efficiency), ("purity", self.purity)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FitError::InvalidNoise(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Perturb `model` using one `draw()` per bit
    pub fn perturb<F>(&self, model: &BitVector, draw: F) -> BitVector
    where
        F: FnMut() -> f64,
    {
        perturb(model, self.efficiency, self.purity, draw)
    }
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self::ideal()
    }
}

/// Draw an observation from the ground-truth bits `model`.
///
/// For each bit in increasing index order exactly one value `r` in [0, 1) is
/// drawn: a set bit stays set iff `r < efficiency`, a clear bit becomes set iff
/// `r > purity`. The probabilities are not range-checked here.
pub fn perturb<F>(model: &BitVector, efficiency: f64, purity: f64, mut draw: F) -> BitVector
where
    F: FnMut() -> f64,
{
    let mut observed = BitVector::zeros(model.len());
    for ibit in 0..model.len() {
        let rval = draw();
        let bit = if model.get(ibit) {
            rval < efficiency
        } else {
            rval > purity
        };
        observed.set(ibit, bit);
    }
    observed
}
