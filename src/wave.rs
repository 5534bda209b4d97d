//! Square-wave parameters and bit encoding
//!
//! A wave lives on the unit measurement interval [0, 1). It is high from its
//! leading edge `phase` for `width`, then low until the next period starts one
//! `wavelength` later. Sampling it at `n` evenly spaced bin centers gives the
//! bit vector that templates and observations share.

use serde::{Deserialize, Serialize};

use crate::bits::BitVector;
use crate::FitError;

/// Wave parameter triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    /// Period length (lambda)
    pub wavelength: f64,
    /// Position of the leading edge of the first wave
    pub phase: f64,
    /// Length of the high part of each period
    pub width: f64,
}

impl WaveParams {
    /// Create new wave parameters
    pub fn new(wavelength: f64, phase: f64, width: f64) -> Self {
        Self {
            wavelength,
            phase,
            width,
        }
    }

    /// Parameters on the `1/nbits` grid
    pub fn from_steps(wavelength_step: usize, phase_step: usize, width_step: usize, nbits: usize) -> Self {
        let fnbits = nbits as f64;
        Self {
            wavelength: wavelength_step as f64 / fnbits,
            phase: phase_step as f64 / fnbits,
            width: width_step as f64 / fnbits,
        }
    }

    /// Whether the triple lies in the fittable domain for `nbits` samples:
    /// wavelength in [2/n, 0.5], phase in [0, wavelength],
    /// width in [1/n, wavelength - 1/n]. NaN components are never valid.
    pub fn validate(&self, nbits: usize) -> bool {
        let fnbits = nbits as f64;
        let bin = 1.0 / fnbits;
        self.wavelength >= 2.0 / fnbits
            && self.wavelength <= 0.5
            && self.phase >= 0.0
            && self.phase <= self.wavelength
            && self.width >= bin
            && self.width <= self.wavelength - bin
    }

    /// [`validate`](Self::validate) as a `Result`, never clamping
    pub fn check(&self, nbits: usize) -> Result<(), FitError> {
        if self.validate(nbits) {
            return Ok(());
        }

        Err(FitError::InvalidParams {
            wavelength: self.wavelength,
            phase: self.phase,
            width: self.width,
            nbits,
        })
    }
}

/// Level of the wave at position `x`
pub fn square_wave(params: &WaveParams, x: f64) -> bool {
    let mut val = (x - params.phase) % params.wavelength;
    if val < 0.0 {
        val += params.wavelength;
    }
    val >= 0.0 && val < params.width
}

/// Sample the wave at the `nbits` bin centers `(i + 0.5) / nbits`.
///
/// Only meaningful for parameters that pass [`WaveParams::validate`].
pub fn encode(params: &WaveParams, nbits: usize) -> BitVector {
    let fnbits = nbits as f64;
    let mut bits = BitVector::zeros(nbits);
    for ibit in 0..nbits {
        let x = (ibit as f64 + 0.5) / fnbits;
        bits.set(ibit, square_wave(params, x));
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 36;

    #[test]
    fn test_minimal_triple_is_legal() {
        let params = WaveParams::new(2.0 / 36.0, 0.0, 1.0 / 36.0);
        assert!(params.validate(N));
        assert!(params.check(N).is_ok());
    }

    #[test]
    fn test_out_of_domain_triples_are_illegal() {
        let eps = 1e-6;
        let base = WaveParams::new(6.0 / 36.0, 0.0, 2.0 / 36.0);
        assert!(base.validate(N));

        assert!(!WaveParams { wavelength: 0.5 + eps, ..base }.validate(N));
        assert!(!WaveParams { phase: -eps, ..base }.validate(N));
        assert!(!WaveParams { width: 0.0, ..base }.validate(N));
        assert!(!WaveParams { wavelength: 1.0 / 36.0, ..base }.validate(N));
        assert!(!WaveParams { phase: base.wavelength + eps, ..base }.validate(N));
        assert!(!WaveParams { width: base.wavelength, ..base }.validate(N));
        assert!(!WaveParams { width: f64::NAN, ..base }.validate(N));
    }

    #[test]
    fn test_check_reports_offending_triple() {
        let params = WaveParams::new(0.7, 0.1, 0.2);
        match params.check(N) {
            Err(FitError::InvalidParams {
                wavelength, nbits, ..
            }) => {
                assert_eq!(wavelength, 0.7);
                assert_eq!(nbits, N);
            }
            other => panic!("expected InvalidParams, got {other:?}"),
        }
    }

    #[test]
    fn test_period_six_pattern() {
        let params = WaveParams::new(6.0 / 36.0, 0.0, 2.0 / 36.0);
        let bits = encode(&params, N);
        for i in 0..N {
            assert_eq!(bits.get(i), i % 6 < 2, "bit {i}");
        }
        assert_eq!(bits.count_ones(), 12);
        assert_eq!(bits.to_string(), "110000".repeat(6));
    }

    #[test]
    fn test_phase_shifts_leading_edge() {
        let params = WaveParams::from_steps(6, 3, 2, N);
        let bits = encode(&params, N);
        for i in 0..N {
            assert_eq!(bits.get(i), (3..5).contains(&(i % 6)), "bit {i}");
        }
    }

    #[test]
    fn test_samples_before_phase_wrap_around() {
        // Leading edge at 5/36 with period 6/36: the tail of the previous wave
        // covers bin 0.
        let params = WaveParams::from_steps(6, 5, 2, N);
        let bits = encode(&params, N);
        assert!(bits.get(0));
        assert!(!bits.get(1));
        assert!(bits.get(5));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let params = WaveParams::new(0.31, 0.07, 0.11);
        assert_eq!(encode(&params, N), encode(&params, N));
    }
}
