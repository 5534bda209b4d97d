//! Square-Wave Fit Example
//!
//! Matches one ground-truth wave exactly and under noise, then runs a short
//! batch of trials and prints how often the truth template is recovered.

use squarewave_fit::trial::{trial_observation, DEFAULT_SEED};
use squarewave_fit::{
    best_match, encode, run_trials, DiagnosticsCollector, NoiseModel, TemplateLibrary, TrialConfig,
    WaveParams,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Running square-wave template fit...\n");

    let nbits = 36;
    let truth = WaveParams::from_steps(6, 0, 2, nbits);
    let noise = NoiseModel::new(0.9, 0.95);
    truth.check(nbits)?;

    let library = TemplateLibrary::build(nbits);
    println!("Configuration:");
    println!("  Bits: {}", nbits);
    println!("  Templates: {}", library.len());
    println!(
        "  Truth: lambda={:.4} phase={:.4} width={:.4}",
        truth.wavelength, truth.phase, truth.width
    );
    println!("  Efficiency: {}  Purity: {}", noise.efficiency, noise.purity);
    println!();

    let model = encode(&truth, nbits);
    println!("Model bits   = {}", model);
    let exact = best_match(&model, &library)?;
    println!(
        "template matches model {} distance {} bits {}",
        exact.index,
        exact.distance,
        library.templates()[exact.index].bits()
    );

    let observed = trial_observation(&model, &noise, DEFAULT_SEED, 0);
    println!("Random bits  = {}", observed);
    let noisy = best_match(&observed, &library)?;
    println!(
        "random bits match model {} distance {} bits {}",
        noisy.index,
        noisy.distance,
        library.templates()[noisy.index].bits()
    );

    let config = TrialConfig {
        nbits,
        truth,
        noise,
        trials: 2000,
        seed: DEFAULT_SEED,
    };
    let mut collector = DiagnosticsCollector::new(&library);
    run_trials(&library, &config, &mut collector)?;
    let summary = collector.summary();

    println!("\nTRIAL SUMMARY");
    println!("=============");
    println!("  Trials:             {}", summary.trials);
    println!("  Exact recovery:     {:.4}", summary.exact_fraction);
    println!("  Mean distance:      {:.4}", summary.mean_distance);
    println!("  Mean wavelength:    {:.4}", summary.mean_wavelength);
    println!("  Mean width:         {:.4}", summary.mean_width);
    println!("  Mean search (us):   {:.3}", summary.mean_search_us);

    println!("\nDone!");
    Ok(())
}
