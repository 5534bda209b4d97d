//! Trial diagnostics
//!
//! Fixed-binning histograms of the quantities a fit run is judged by: best
//! distance, winning template index, recovered wave parameters and search
//! latency. The collector plugs into the trial runner as a [`TrialObserver`].

use serde::Serialize;

use crate::library::TemplateLibrary;
use crate::search::MatchResult;
use crate::trial::{TrialObserver, TrialRecord};

/// One-dimensional histogram with uniform bins over `[low, high)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub title: String,
    pub low: f64,
    pub high: f64,
    pub counts: Vec<u64>,
    pub underflow: u64,
    pub overflow: u64,
    #[serde(skip)]
    sum: f64,
}

impl Histogram {
    /// # Panics
    /// If `bins` is zero or the range is empty.
    pub fn new(title: impl Into<String>, bins: usize, low: f64, high: f64) -> Self {
        assert!(bins > 0, "histogram needs at least one bin");
        assert!(high > low, "histogram range must be non-empty");
        Self {
            title: title.into(),
            low,
            high,
            counts: vec![0; bins],
            underflow: 0,
            overflow: 0,
            sum: 0.0,
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.sum += value;
        if value < self.low {
            self.underflow += 1;
            return;
        }
        if value >= self.high || value.is_nan() {
            self.overflow += 1;
            return;
        }

        let bins = self.counts.len();
        let idx = ((value - self.low) / self.bin_width()) as usize;
        self.counts[idx.min(bins - 1)] += 1;
    }

    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.counts.len() as f64
    }

    /// Lower edge of bin `idx`
    pub fn bin_low_edge(&self, idx: usize) -> f64 {
        self.low + idx as f64 * self.bin_width()
    }

    /// Fills including under/overflow
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum::<u64>() + self.underflow + self.overflow
    }

    /// Mean of every filled value
    pub fn mean(&self) -> f64 {
        let n = self.entries();
        if n == 0 {
            return 0.0;
        }
        self.sum / n as f64
    }

    /// Index of the fullest bin, lowest on ties
    pub fn mode_bin(&self) -> Option<usize> {
        let max = *self.counts.iter().max()?;
        if max == 0 {
            return None;
        }
        self.counts.iter().position(|&c| c == max)
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.underflow = 0;
        self.overflow = 0;
        self.sum = 0.0;
    }
}

/// Histograms over a run, sized for one library
#[derive(Debug, Clone)]
pub struct DiagnosticsCollector {
    pub distance: Histogram,
    pub model: Histogram,
    pub wavelength: Histogram,
    pub phase: Histogram,
    pub width: Histogram,
    pub duration: Histogram,
    truth: Option<MatchResult>,
    exact: u64,
}

/// Serializable digest of a [`DiagnosticsCollector`]
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsSummary {
    pub trials: u64,
    pub truth_index: Option<usize>,
    pub truth_distance: Option<u32>,
    pub exact_fraction: f64,
    pub mean_distance: f64,
    pub mean_wavelength: f64,
    pub mean_phase: f64,
    pub mean_width: f64,
    pub mean_search_us: f64,
    pub distance_counts: Vec<u64>,
}

impl DiagnosticsCollector {
    pub fn new(library: &TemplateLibrary) -> Self {
        let nbits = library.nbits() as f64;
        let models = library.len() as f64;
        Self {
            distance: Histogram::new("Best Overlap", library.nbits() + 1, -0.5, nbits + 0.5),
            model: Histogram::new("Best Model", library.len() + 1, -0.5, models + 0.5),
            wavelength: Histogram::new("Wavelength", 100, 0.0, 0.6),
            phase: Histogram::new("Phase", 100, 0.0, 1.0),
            width: Histogram::new("Width", 100, 0.0, 1.0),
            duration: Histogram::new("Search Time (us)", 51, -0.5, 50.5),
            truth: None,
            exact: 0,
        }
    }

    pub fn trials(&self) -> u64 {
        self.distance.entries()
    }

    pub fn reset(&mut self) {
        for hist in [
            &mut self.distance,
            &mut self.model,
            &mut self.wavelength,
            &mut self.phase,
            &mut self.width,
            &mut self.duration,
        ] {
            hist.reset();
        }
        self.truth = None;
        self.exact = 0;
    }

    pub fn summary(&self) -> DiagnosticsSummary {
        let trials = self.trials();
        DiagnosticsSummary {
            trials,
            truth_index: self.truth.map(|t| t.index),
            truth_distance: self.truth.map(|t| t.distance),
            exact_fraction: if trials == 0 {
                0.0
            } else {
                self.exact as f64 / trials as f64
            },
            mean_distance: self.distance.mean(),
            mean_wavelength: self.wavelength.mean(),
            mean_phase: self.phase.mean(),
            mean_width: self.width.mean(),
            mean_search_us: self.duration.mean(),
            distance_counts: self.distance.counts.clone(),
        }
    }
}

impl TrialObserver for DiagnosticsCollector {
    fn on_truth(&mut self, truth: &MatchResult) {
        self.truth = Some(*truth);
    }

    fn on_trial(&mut self, record: &TrialRecord) {
        self.distance.fill(f64::from(record.distance));
        self.model.fill(record.template_index as f64);
        self.wavelength.fill(record.wavelength);
        self.phase.fill(record.phase);
        self.width.fill(record.width);
        self.duration.fill(record.search_us);
        if self.truth.is_some_and(|t| t.index == record.template_index) {
            self.exact += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_binning() {
        let mut hist = Histogram::new("h", 4, 0.0, 4.0);
        for v in [-1.0, 0.0, 0.5, 1.0, 3.99, 4.0, 10.0] {
            hist.fill(v);
        }
        assert_eq!(hist.counts, vec![2, 1, 0, 1]);
        assert_eq!(hist.underflow, 1);
        assert_eq!(hist.overflow, 2);
        assert_eq!(hist.entries(), 7);
        assert_eq!(hist.mode_bin(), Some(0));
        assert_eq!(hist.bin_low_edge(2), 2.0);
    }

    #[test]
    fn test_distance_bins_are_centered_on_integers() {
        let mut hist = Histogram::new("d", 37, -0.5, 36.5);
        for d in 0..=36u32 {
            hist.fill(f64::from(d));
        }
        assert!(hist.counts.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_histogram_reset() {
        let mut hist = Histogram::new("h", 2, 0.0, 1.0);
        hist.fill(0.2);
        hist.fill(2.0);
        hist.reset();
        assert_eq!(hist.entries(), 0);
        assert_eq!(hist.mean(), 0.0);
    }

    #[test]
    fn test_collector_tracks_exact_recoveries() {
        let library = TemplateLibrary::build(12);
        let mut collector = DiagnosticsCollector::new(&library);
        collector.on_truth(&MatchResult {
            index: 3,
            distance: 0,
        });

        let params = *library.params(3).unwrap();
        for (trial, index) in [3usize, 3, 5, 3].into_iter().enumerate() {
            collector.on_trial(&TrialRecord {
                trial,
                template_index: index,
                distance: if index == 3 { 0 } else { 2 },
                wavelength: params.wavelength,
                phase: params.phase,
                width: params.width,
                search_us: 1.0,
            });
        }

        let summary = collector.summary();
        assert_eq!(summary.trials, 4);
        assert_eq!(summary.truth_index, Some(3));
        assert!((summary.exact_fraction - 0.75).abs() < 1e-12);
        assert!((summary.mean_distance - 0.5).abs() < 1e-12);
        assert_eq!(summary.distance_counts[0], 3);
        assert_eq!(summary.distance_counts[2], 1);

        collector.reset();
        assert_eq!(collector.trials(), 0);
        assert_eq!(collector.summary().truth_index, None);
    }
}
