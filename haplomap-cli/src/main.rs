use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use haplomap_core::Result;
use haplomap_stats::{EstimatorConfig, HeatmapEstimator};
use log::{info, LevelFilter};

mod load;
mod output;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "haplomap", version, about = "Empirical-Bayes haplogroup heatmap estimation")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate per-location frequencies from marker and baseline counts
    Estimate(EstimateArgs),
    /// Print the frequency colour legend
    Legend,
}

#[derive(Args)]
struct EstimateArgs {
    /// Sample counts for the selected haplogroup (.csv or .json)
    #[arg(long, value_name = "FILE")]
    marker: PathBuf,

    /// Sample counts for the unfiltered population (.csv or .json)
    #[arg(long, value_name = "FILE")]
    baseline: PathBuf,

    /// Estimator overrides (.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Number of locations in the ranking; defaults to the config's top_n
    #[arg(long, value_name = "N")]
    top: Option<usize>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("HAPLOMAP_LOG")
        .format_timestamp(None)
        .init();
}

fn run_estimate(args: EstimateArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load::load_config(path)?,
        None => EstimatorConfig::default(),
    };
    let top = args.top.unwrap_or(config.top_n);
    let estimator = HeatmapEstimator::new(config)?;

    let marker = load::load_observations(&args.marker)?;
    let baseline = load::load_observations(&args.baseline)?;
    let heatmap = estimator.estimate(&marker, &baseline);
    info!("estimated {} locations", heatmap.estimates.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::write_heatmap(&heatmap, args.format, top, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Estimate(args) => run_estimate(args),
        Command::Legend => output::write_legend(&mut io::stdout().lock()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
