//! Contango CLI binary.
//!
//! Provides command-line interface for the contango basis analytics engine.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::analyze::{AnalyzeArgs, OutputFormat, run_analysis};
use cmd::transforms::list_transforms;
use contango_traits::{AlignmentPolicy, SamplingInterval};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contango")]
#[command(about = "Futures-vs-spot basis analytics for crypto markets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the basis between a spot and a futures CSV file
    Analyze {
        /// Spot prices (CSV with `timestamp` and `close` columns)
        #[arg(long)]
        spot: PathBuf,

        /// Futures prices (CSV with `timestamp` and `close` columns)
        #[arg(long)]
        futures: PathBuf,

        /// Sampling interval of both files (e.g. 15m, 1h, 4h, 1d)
        #[arg(short, long, default_value = "1h")]
        interval: SamplingInterval,

        /// JSON analysis configuration; missing fields take defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Alignment policy (inner or interpolated), overrides the config file
        #[arg(short, long)]
        policy: Option<AlignmentPolicy>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Directory to save the analysis table and summary statistics
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List available transforms
    Transforms {
        /// Filter by stage
        #[arg(short, long)]
        stage: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            spot,
            futures,
            interval,
            config,
            policy,
            format,
            output_dir,
        } => {
            run_analysis(AnalyzeArgs {
                spot,
                futures,
                interval,
                config,
                policy,
                format,
                output_dir,
            })?;
        }
        Commands::Transforms { stage, verbose } => {
            list_transforms(stage, verbose)?;
        }
    }

    Ok(())
}
