use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;
use serde::Serialize;

use crate::config::FitConfig;
use crate::diagnostics::DiagnosticsSummary;
use crate::trial::{TrialRecord, TrialReport};
use crate::wave::WaveParams;
use crate::FitError;

pub const OUTPUT_SCHEMA_VERSION: &str = "1.0.0";

/// Everything written to `summary.json` for one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub schema_version: String,
    pub config: FitConfig,
    pub library_size: usize,
    pub truth_bits: String,
    pub truth_index: usize,
    pub truth_distance: u32,
    pub truth_fit: WaveParams,
    pub diagnostics: DiagnosticsSummary,
}

impl RunSummary {
    pub fn new(
        config: &FitConfig,
        library_size: usize,
        report: &TrialReport,
        diagnostics: DiagnosticsSummary,
    ) -> Self {
        Self {
            schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
            config: config.clone(),
            library_size,
            truth_bits: report.truth_bits.to_string(),
            truth_index: report.truth_match.index,
            truth_distance: report.truth_match.distance,
            truth_fit: report.truth_fit,
            diagnostics,
        }
    }
}

pub fn ensure_outdir(outdir: &Path) -> Result<(), FitError> {
    fs::create_dir_all(outdir)?;
    Ok(())
}

/// Fresh `<root>/<UTC timestamp>` directory, suffixed if it already exists
pub fn create_timestamped_output_dir(root: &Path) -> Result<PathBuf, FitError> {
    ensure_outdir(root)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

pub fn write_trials_csv(path: &Path, records: &[TrialRecord]) -> Result<(), FitError> {
    let mut writer = Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), FitError> {
    fs::write(path, serde_json::to_string_pretty(summary)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticsCollector;
    use crate::library::TemplateLibrary;
    use crate::trial::run_trials;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("squarewave-fit-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_timestamped_dirs_are_unique() {
        let root = scratch_dir("outdirs");
        let a = create_timestamped_output_dir(&root).unwrap();
        let b = create_timestamped_output_dir(&root).unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_run_outputs_are_written() {
        let dir = scratch_dir("outputs");
        ensure_outdir(&dir).unwrap();

        let config = FitConfig {
            trials: 12,
            ..FitConfig::default()
        };
        let library = TemplateLibrary::build(config.nbits);
        let mut records = Vec::new();
        let report = run_trials(&library, &config.trial_config(), &mut records).unwrap();

        let mut collector = DiagnosticsCollector::new(&library);
        for record in &records {
            crate::trial::TrialObserver::on_trial(&mut collector, record);
        }

        let csv_path = dir.join("trials.csv");
        write_trials_csv(&csv_path, &records).unwrap();
        let csv = fs::read_to_string(&csv_path).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("trial,template_index,distance,wavelength,phase,width,search_us")
        );
        assert_eq!(lines.count(), 12);

        let summary = RunSummary::new(&config, library.len(), &report, collector.summary());
        let json_path = dir.join("summary.json");
        write_summary_json(&json_path, &summary).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["library_size"], 1600);
        assert_eq!(value["config"]["nbits"], 36);
        assert_eq!(value["diagnostics"]["trials"], 12);

        fs::remove_dir_all(&dir).unwrap();
    }
}
