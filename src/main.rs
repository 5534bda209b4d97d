use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use squarewave_fit::io::{
    create_timestamped_output_dir, write_summary_json, write_trials_csv, RunSummary,
};
use squarewave_fit::{
    run_trials, run_trials_parallel, DiagnosticsCollector, FitConfig, MatchResult, TemplateLibrary,
    TrialObserver, TrialRecord,
};

const LOCAL_CONFIG: &str = "squarewave-fit.toml";

#[derive(Debug, Parser)]
#[command(name = "squarewave-fit")]
#[command(about = "Exhaustive template fitting of noisy binary-sampled square waves")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "output-squarewave-fit")]
    outdir: PathBuf,

    #[arg(long)]
    nbits: Option<usize>,

    #[arg(long)]
    trials: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    efficiency: Option<f64>,

    #[arg(long)]
    purity: Option<f64>,

    #[arg(long, default_value_t = false)]
    parallel: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Forwards every record to the histograms and keeps it for the CSV
struct RunObserver {
    collector: DiagnosticsCollector,
    records: Vec<TrialRecord>,
}

impl TrialObserver for RunObserver {
    fn on_truth(&mut self, truth: &MatchResult) {
        self.collector.on_truth(truth);
    }

    fn on_trial(&mut self, record: &TrialRecord) {
        self.collector.on_trial(record);
        self.records.push(record.clone());
    }
}

fn load_config(path: Option<&Path>) -> Result<FitConfig> {
    if let Some(path) = path {
        return FitConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()));
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return FitConfig::load(&local)
            .with_context(|| format!("failed to load config: {}", local.display()));
    }

    Ok(FitConfig::default())
}

fn apply_overrides(cli: &Cli, config: &mut FitConfig) {
    if let Some(nbits) = cli.nbits {
        config.nbits = nbits;
    }
    if let Some(trials) = cli.trials {
        config.trials = trials;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(efficiency) = cli.efficiency {
        config.efficiency = efficiency;
    }
    if let Some(purity) = cli.purity {
        config.purity = purity;
    }
    if cli.parallel {
        config.parallel = true;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&cli, &mut config);
    config.validate().context("invalid fit configuration")?;

    let library = TemplateLibrary::build(config.nbits);
    let trial_config = config.trial_config();

    let mut observer = RunObserver {
        collector: DiagnosticsCollector::new(&library),
        records: Vec::with_capacity(config.trials),
    };
    let report = if config.parallel {
        run_trials_parallel(&library, &trial_config, &mut observer)
    } else {
        run_trials(&library, &trial_config, &mut observer)
    }
    .context("trial run failed")?;

    let output_dir = create_timestamped_output_dir(&cli.outdir).with_context(|| {
        format!("failed to create output directory under {}", cli.outdir.display())
    })?;

    write_trials_csv(&output_dir.join("trials.csv"), &observer.records)
        .context("failed to write trials.csv")?;
    let summary = RunSummary::new(
        &config,
        library.len(),
        &report,
        observer.collector.summary(),
    );
    write_summary_json(&output_dir.join("summary.json"), &summary)
        .context("failed to write summary.json")?;

    info!(
        exact_fraction = summary.diagnostics.exact_fraction,
        mean_distance = summary.diagnostics.mean_distance,
        mean_search_us = summary.diagnostics.mean_search_us,
        "run summary"
    );
    println!("Output directory: {}", output_dir.display());
    Ok(())
}
