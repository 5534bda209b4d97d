use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::noise::NoiseModel;
use crate::trial::{TrialConfig, DEFAULT_SEED};
use crate::wave::WaveParams;
use crate::{FitError, DEFAULT_NBITS};

/// Smallest bit width whose template library is non-empty
pub const MIN_NBITS: usize = 8;

pub const DEFAULT_TRIALS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub nbits: usize,
    pub wavelength: f64,
    pub phase: f64,
    pub width: f64,
    pub efficiency: f64,
    pub purity: f64,
    pub trials: usize,
    pub seed: u64,
    pub parallel: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        let fnbits = DEFAULT_NBITS as f64;
        Self {
            nbits: DEFAULT_NBITS,
            wavelength: 6.0 / fnbits,
            phase: 0.0,
            width: 2.0 / fnbits,
            efficiency: 0.9,
            purity: 0.95,
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            parallel: false,
        }
    }
}

impl FitConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, FitError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, FitError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn truth(&self) -> WaveParams {
        WaveParams::new(self.wavelength, self.phase, self.width)
    }

    pub fn noise(&self) -> NoiseModel {
        NoiseModel::new(self.efficiency, self.purity)
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.nbits < MIN_NBITS {
            return Err(FitError::InvalidConfig(format!(
                "nbits must be at least {MIN_NBITS}, got {}",
                self.nbits
            )));
        }

        if self.trials == 0 {
            return Err(FitError::InvalidConfig(
                "trials must be greater than zero".to_string(),
            ));
        }

        self.noise().check()?;
        self.truth().check(self.nbits)?;
        Ok(())
    }

    pub fn trial_config(&self) -> TrialConfig {
        TrialConfig {
            nbits: self.nbits,
            truth: self.truth(),
            noise: self.noise(),
            trials: self.trials,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FitConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trial_config().nbits, 36);
        assert_eq!(config.seed, 1_238_123);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FitConfig::from_toml_str(
            r#"
            nbits = 48
            wavelength = 0.25
            width = 0.0625
            trials = 50
            parallel = true
            "#,
        )
        .unwrap();
        assert_eq!(config.nbits, 48);
        assert_eq!(config.trials, 50);
        assert!(config.parallel);
        assert_eq!(config.efficiency, FitConfig::default().efficiency);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let err = FitConfig::from_toml_str("nbits = \"many\"").unwrap_err();
        assert!(matches!(err, FitError::Toml(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let small = FitConfig {
            nbits: 7,
            ..FitConfig::default()
        };
        assert!(matches!(small.validate(), Err(FitError::InvalidConfig(_))));

        let no_trials = FitConfig {
            trials: 0,
            ..FitConfig::default()
        };
        assert!(matches!(no_trials.validate(), Err(FitError::InvalidConfig(_))));

        let noisy = FitConfig {
            purity: 1.5,
            ..FitConfig::default()
        };
        assert!(matches!(noisy.validate(), Err(FitError::InvalidNoise(_))));

        let wide = FitConfig {
            width: 6.0 / 36.0,
            ..FitConfig::default()
        };
        assert!(matches!(wide.validate(), Err(FitError::InvalidParams { .. })));
    }
}
