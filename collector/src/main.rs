use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use click_engine::{Granularity, compute_period_series};
use shared::config::TrackerConfig;
use shared::storage::{self, SampleStore};
use tracing::{error, info, warn};

use crate::badge::BadgeReader;
use crate::cancellation::CancellationToken;

mod badge;
mod cancellation;

#[derive(Parser)]
#[command(about = "Samples a view counter badge into the sample store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the badge every `interval_seconds` until interrupted (default)
    Run,
    /// Append the rows of a `timestamp,number` CSV export to the sample store
    Import { csv: PathBuf },
    /// Print the per-period increments of the stored samples
    Report {
        #[arg(default_value = "day")]
        granularity: Granularity,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing!()?;
    let config = shared::load_tracker_config!()?;
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let token = cancellation::cancel_on_ctrl_c();
            poll(&config, token).await
        }
        Command::Import { csv } => import(&config, &csv),
        Command::Report { granularity } => report(&config, granularity),
    }
}

async fn poll(config: &TrackerConfig, mut token: CancellationToken) -> Result<()> {
    let reader = BadgeReader::new(config.source_url.clone())?;
    let store = SampleStore::new(&config.samples_path);
    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_seconds.max(1)));

    info!(
        "Sampling every {}s into {:?}",
        config.interval_seconds,
        store.path()
    );

    while !token.is_cancelled() {
        tokio::select! {
            _ = interval.tick() => {}
            _ = token.cancelled() => break,
        }

        let value = match reader.read().await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read counter: {e:#}");
                continue;
            }
        };

        match store.record(Local::now().naive_local(), value) {
            Ok(recorded) => info!(value, ?recorded, "Recorded sample"),
            Err(e) => error!("Failed to store sample: {e:#}"),
        }
    }

    info!("Stopped");
    Ok(())
}

fn import(config: &TrackerConfig, csv: &Path) -> Result<()> {
    let samples = storage::import_csv(csv)?;
    let store = SampleStore::new(&config.samples_path);
    let written = store
        .extend(&samples)
        .with_context(|| format!("Failed to import {csv:?}"))?;
    info!("Imported {written} samples into {:?}", store.path());
    Ok(())
}

fn report(config: &TrackerConfig, granularity: Granularity) -> Result<()> {
    let samples = SampleStore::new(&config.samples_path).load()?;
    let series = compute_period_series(&samples, granularity)?;
    if series.is_empty() {
        println!("Not enough samples for a report ({} stored)", samples.len());
        return Ok(());
    }

    println!("period\t{}", granularity.series_column());
    for (start, increment) in series.iter() {
        println!("{}\t{increment:.2}", granularity.label(start));
    }
    println!("total\t{:.2}", series.total());
    Ok(())
}
