use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use fragstat::{
    driver::{Driver, EventCount},
    replay::Replay,
    settings::CommandFile,
};

/// Histograms of primary hadrons from q-qbar string fragmentation
#[derive(Parser, Debug)]
#[command(name = "fragstat")]
#[command(version)]
struct Args {
    /// Command file with run settings and subrun blocks
    #[arg(value_name = "SETTINGS")]
    settings: PathBuf,

    /// Event files to replay, one per subrun (LHEF or HepMC2)
    #[arg(short, long, required = true, num_args = 1..)]
    events: Vec<PathBuf>,

    /// Output directory for histogram tables
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Normalise spectra to the number of generated events
    /// instead of the number of requested events
    #[arg(long)]
    normalise_by_completed: bool,

    /// Print histogram summaries
    #[arg(long)]
    print: bool,
}

fn main() -> Result<()> {
    use env_logger::Env;
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cmnd = CommandFile::from_path(&args.settings)
        .with_context(|| format!("Failed to load settings from {}", args.settings.display()))?;

    let count = if args.normalise_by_completed {
        EventCount::Completed
    } else {
        EventCount::Configured
    };
    let mut driver = Driver::new(Replay::new(args.events)).normalise_by(count);
    let results = driver.run(&cmnd)?;

    for result in results {
        if args.print {
            for hist in &result.summary.histograms {
                println!("{hist}");
            }
        }
        result
            .export(&args.out)
            .with_context(|| format!("Failed to write histograms to {}", args.out.display()))?;
        info!(
            "Wrote {} histograms for {} to {}",
            result.summary.histograms.len(),
            result.config.label,
            args.out.display()
        );
    }
    Ok(())
}
