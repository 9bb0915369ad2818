#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `location_insights` command-line entry point.
//!
//! Uses `indicatif-log-bridge` (via
//! [`location_insights_cli_utils::init_logger`]) to route `log` output
//! through `indicatif::MultiProgress` so that log lines and progress bars
//! never fight for the terminal.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use location_insights_cli::config::PipelineConfig;
use location_insights_cli::pipeline::{Pipeline, PipelineStage};
use location_insights_cli::report;
use location_insights_cli_utils::IndicatifProgress;

#[derive(Parser)]
#[command(
    name = "location_insights",
    about = "Synthetic location analytics: users, events, hotspots, and zone ranking"
)]
struct Cli {
    /// Pipeline configuration file (TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Command-line values that take precedence over the configuration file.
#[derive(Args)]
struct Overrides {
    /// Random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Number of users to synthesize
    #[arg(long, global = true)]
    users: Option<usize>,

    /// Output directory for exported files
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Clustering radius in degrees
    #[arg(long, global = true)]
    eps: Option<f64>,

    /// Minimum points (including itself) for a core point
    #[arg(long, global = true)]
    min_samples: Option<usize>,

    /// Skip hotspot clustering
    #[arg(long, global = true)]
    no_clustering: bool,
}

impl Overrides {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(users) = self.users {
            config.population.num_users = users;
        }
        if let Some(dir) = &self.output {
            config.output.dir.clone_from(dir);
        }
        if let Some(eps) = self.eps {
            config.clustering.eps = eps;
        }
        if let Some(min_samples) = self.min_samples {
            config.clustering.min_samples = min_samples;
        }
        if self.no_clustering {
            config.clustering.enabled = false;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate data, run every analytic stage, export files, and print a
    /// report
    Run {
        /// Skip writing output files
        #[arg(long)]
        no_export: bool,
    },
    /// List the effective region registry
    Regions,
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = location_insights_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    cli.overrides.apply(&mut config);

    match cli.command {
        Commands::Run { no_export } => {
            let now = chrono::Local::now().naive_local();
            let pipeline = Pipeline::new(config, now)?;

            let stages = IndicatifProgress::steps_bar(
                &multi,
                "Pipeline",
                PipelineStage::ALL.len() as u64,
            );
            let records = IndicatifProgress::records_bar(&multi, "Events");
            let output = pipeline.run_with_progress(stages.as_ref(), records.as_ref())?;

            if !no_export && pipeline.config().output.export {
                for path in pipeline.export(&output)? {
                    log::info!("Wrote {}", path.display());
                }
            }

            println!();
            report::render(&mut std::io::stdout().lock(), &output.report)?;
        }
        Commands::Regions => {
            let registry = config.registry()?;
            report::render_regions(&mut std::io::stdout().lock(), &registry)?;
        }
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
