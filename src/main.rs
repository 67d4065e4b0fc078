use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use aki_baseline::utils::arrow::{
    baselines_to_record_batch, encounters_from_record_batches, observations_from_record_batches,
    stages_to_record_batch, unstageable_to_record_batch,
};
use aki_baseline::utils::io::{read_parquet, write_parquet};
use aki_baseline::{AkiPipeline, CohortInput, PipelineConfig};

/// Resolve baseline creatinine and stage AKI for pediatric ICU encounters
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Parquet file of ICU encounters
    #[arg(long)]
    encounters: PathBuf,

    /// Parquet file of creatinine observations
    #[arg(long)]
    observations: PathBuf,

    /// Directory for baselines.parquet, aki_stages.parquet and unstageable.parquet
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// JSON pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads (overrides the configuration file)
    #[arg(long)]
    threads: Option<usize>,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if args.threads.is_some() {
        config.num_threads = args.threads;
    }
    if args.progress {
        config.reporting.show_progress = true;
    }
    info!("{config}");

    let pipeline = AkiPipeline::new(config).context("Failed to initialise pipeline")?;

    let encounters = encounters_from_record_batches(
        &read_parquet(&args.encounters)
            .with_context(|| format!("Failed to read {}", args.encounters.display()))?,
    )
    .context("Encounter table does not match the expected columns")?;
    let observations = observations_from_record_batches(
        &read_parquet(&args.observations)
            .with_context(|| format!("Failed to read {}", args.observations.display()))?,
    )
    .context("Observation table does not match the expected columns")?;

    let output = pipeline.run(CohortInput {
        encounters,
        observations,
    })?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;
    write_parquet(
        &args.output_dir.join("baselines.parquet"),
        &baselines_to_record_batch(&output.baselines)?,
    )?;
    write_parquet(
        &args.output_dir.join("aki_stages.parquet"),
        &stages_to_record_batch(&output.stages)?,
    )?;
    write_parquet(
        &args.output_dir.join("unstageable.parquet"),
        &unstageable_to_record_batch(&output.unstageable)?,
    )?;

    let unstageable = output.statistics.unstageable_count();
    if unstageable > 0 {
        warn!("{unstageable} encounters could not be staged");
    }
    Ok(())
}
