//! Monte Carlo trial harness
//!
//! Encodes a ground-truth wave, matches it exactly against the library, then
//! repeatedly perturbs it with the noise model and records the best match for
//! each noisy observation. Results stream out through a [`TrialObserver`];
//! nothing here aggregates them.
//!
//! Every trial draws from its own ChaCha stream (run seed, stream = trial
//! index), so sequential and parallel runs see the same observations.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::bits::BitVector;
use crate::library::TemplateLibrary;
use crate::noise::NoiseModel;
use crate::search::{best_match, MatchResult};
use crate::wave::{encode, WaveParams};
use crate::FitError;

/// Seed used by the reference harness
pub const DEFAULT_SEED: u64 = 1_238_123;

/// Input of one trial run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialConfig {
    pub nbits: usize,
    pub truth: WaveParams,
    pub noise: NoiseModel,
    pub trials: usize,
    pub seed: u64,
}

/// Result of one noisy trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial: usize,
    pub template_index: usize,
    pub distance: u32,
    pub wavelength: f64,
    pub phase: f64,
    pub width: f64,
    pub search_us: f64,
}

impl TrialRecord {
    pub fn match_result(&self) -> MatchResult {
        MatchResult {
            index: self.template_index,
            distance: self.distance,
        }
    }

    pub fn fitted(&self) -> WaveParams {
        WaveParams::new(self.wavelength, self.phase, self.width)
    }
}

/// Receives trial outcomes as they are produced
pub trait TrialObserver {
    /// Match of the noise-free ground-truth encoding
    fn on_truth(&mut self, _truth: &MatchResult) {}

    /// One noisy trial
    fn on_trial(&mut self, record: &TrialRecord);
}

impl TrialObserver for Vec<TrialRecord> {
    fn on_trial(&mut self, record: &TrialRecord) {
        self.push(record.clone());
    }
}

/// Discards everything
impl TrialObserver for () {
    fn on_trial(&mut self, _record: &TrialRecord) {}
}

/// Run-level outcome
#[derive(Debug, Clone, PartialEq)]
pub struct TrialReport {
    /// Noise-free encoding of the truth
    pub truth_bits: BitVector,
    /// Best match of `truth_bits`
    pub truth_match: MatchResult,
    /// Parameters of that template
    pub truth_fit: WaveParams,
    /// Number of noisy trials delivered to the observer
    pub trials: usize,
    /// Trials whose best match is the truth template
    pub exact_recoveries: usize,
}

/// Noisy observation of `truth_bits` for trial `trial`
pub fn trial_observation(truth_bits: &BitVector, noise: &NoiseModel, seed: u64, trial: usize) -> BitVector {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    let unit = Uniform::new(0.0_f64, 1.0);
    noise.perturb(truth_bits, || unit.sample(&mut rng))
}

/// Run `config.trials` noisy trials sequentially, in trial order
pub fn run_trials<O>(
    library: &TemplateLibrary,
    config: &TrialConfig,
    observer: &mut O,
) -> Result<TrialReport, FitError>
where
    O: TrialObserver + ?Sized,
{
    let (truth_bits, truth_match, truth_fit) = prepare(library, config)?;
    observer.on_truth(&truth_match);

    let mut exact_recoveries = 0;
    for itrial in 0..config.trials {
        let record = run_one(library, config, &truth_bits, itrial)?;
        if record.template_index == truth_match.index {
            exact_recoveries += 1;
        }
        observer.on_trial(&record);
    }

    let report = TrialReport {
        truth_bits,
        truth_match,
        truth_fit,
        trials: config.trials,
        exact_recoveries,
    };
    log_report(&report);
    Ok(report)
}

/// [`run_trials`] with the searches spread over the rayon pool.
///
/// The observer still sees records in trial order, and they match the
/// sequential run apart from `search_us`.
pub fn run_trials_parallel<O>(
    library: &TemplateLibrary,
    config: &TrialConfig,
    observer: &mut O,
) -> Result<TrialReport, FitError>
where
    O: TrialObserver + ?Sized,
{
    let (truth_bits, truth_match, truth_fit) = prepare(library, config)?;
    observer.on_truth(&truth_match);

    let records = (0..config.trials)
        .into_par_iter()
        .map(|itrial| run_one(library, config, &truth_bits, itrial))
        .collect::<Result<Vec<_>, _>>()?;

    let mut exact_recoveries = 0;
    for record in &records {
        if record.template_index == truth_match.index {
            exact_recoveries += 1;
        }
        observer.on_trial(record);
    }

    let report = TrialReport {
        truth_bits,
        truth_match,
        truth_fit,
        trials: records.len(),
        exact_recoveries,
    };
    log_report(&report);
    Ok(report)
}

fn prepare(
    library: &TemplateLibrary,
    config: &TrialConfig,
) -> Result<(BitVector, MatchResult, WaveParams), FitError> {
    if config.nbits != library.nbits() {
        return Err(FitError::WidthMismatch {
            context: "trial configuration",
            expected: library.nbits(),
            got: config.nbits,
        });
    }
    config.truth.check(config.nbits)?;
    config.noise.check()?;

    let truth_bits = encode(&config.truth, config.nbits);
    let truth_match = best_match(&truth_bits, library)?;
    let truth_fit = *library
        .params(truth_match.index)
        .ok_or(FitError::EmptyLibrary)?;

    info!(
        truth = %truth_bits,
        index = truth_match.index,
        distance = truth_match.distance,
        "ground truth matched"
    );
    Ok((truth_bits, truth_match, truth_fit))
}

fn run_one(
    library: &TemplateLibrary,
    config: &TrialConfig,
    truth_bits: &BitVector,
    itrial: usize,
) -> Result<TrialRecord, FitError> {
    let observation = trial_observation(truth_bits, &config.noise, config.seed, itrial);

    let start = Instant::now();
    let result = best_match(&observation, library)?;
    let search_us = start.elapsed().as_secs_f64() * 1e6;

    let fitted = library.params(result.index).ok_or(FitError::EmptyLibrary)?;
    trace!(
        trial = itrial,
        observed = %observation,
        index = result.index,
        distance = result.distance,
        "trial matched"
    );

    Ok(TrialRecord {
        trial: itrial,
        template_index: result.index,
        distance: result.distance,
        wavelength: fitted.wavelength,
        phase: fitted.phase,
        width: fitted.width,
        search_us,
    })
}

fn log_report(report: &TrialReport) {
    let fraction = if report.trials == 0 {
        0.0
    } else {
        report.exact_recoveries as f64 / report.trials as f64
    };
    info!(
        trials = report.trials,
        exact_recoveries = report.exact_recoveries,
        exact_fraction = fraction,
        "trial run finished"
    );
}
