//! objcount CLI - segment, split and measure objects in a directory of images.

use clap::{Args, Parser, Subcommand, ValueEnum};
use objcount::{BatchOptions, PipelineConfig, RawConfig, run_batch};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "objcount")]
#[command(about = "Count and measure objects in photographs")]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every image in a directory.
    Run(RunArgs),
    /// Validate a configuration and print it as JSON.
    CheckConfig(ConfigArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Directory of input images (png, jpg, jpeg).
    #[arg(long)]
    input: PathBuf,

    /// Directory of comparison images, paired by file name (difference strategy).
    #[arg(long)]
    compare: Option<PathBuf>,

    /// Directory for tables and overlays; created if missing.
    #[arg(long, default_value = "results")]
    output: PathBuf,

    /// Keep processing after an image fails.
    #[arg(long)]
    keep_going: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum DelimiterArg {
    Tab,
    Comma,
}

#[derive(Clone, Copy, ValueEnum)]
enum OverlayArg {
    Png,
    Jpg,
}

/// Configuration flags; each one overrides the value from `--config`.
#[derive(Args)]
struct ConfigArgs {
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Segmentation strategy: threshold, difference or edgeDetection.
    #[arg(long)]
    strategy: Option<String>,

    /// Segmentation threshold (strategy default if omitted).
    #[arg(long)]
    threshold: Option<f64>,

    /// Label connected components without watershed splitting.
    #[arg(long)]
    no_split: bool,

    /// Gaussian sigma for the distance field before marker search.
    #[arg(long)]
    sigma: Option<f64>,

    /// Smallest object area kept, in pixels.
    #[arg(long)]
    min_size: Option<i64>,

    /// Largest object area kept, in pixels.
    #[arg(long)]
    max_size: Option<i64>,

    /// Pixel connectivity (4 or 8).
    #[arg(long)]
    connectivity: Option<u32>,

    /// Results table separator.
    #[arg(long, value_enum)]
    delimiter: Option<DelimiterArg>,

    /// Overlay image format.
    #[arg(long, value_enum)]
    overlay_format: Option<OverlayArg>,
}

impl ConfigArgs {
    fn resolve(&self) -> CliResult<PipelineConfig> {
        let mut raw = match &self.config {
            Some(path) => RawConfig::from_json_file(path)?,
            None => RawConfig::default(),
        };
        if let Some(strategy) = &self.strategy {
            raw.segmentation_strategy = strategy.clone();
            // a threshold from the file belongs to the file's strategy
            raw.threshold_value = None;
        }
        if let Some(threshold) = self.threshold {
            raw.threshold_value = Some(threshold);
        }
        if self.no_split {
            raw.split_enabled = false;
        }
        if let Some(sigma) = self.sigma {
            raw.gaussian_spread = sigma;
        }
        if let Some(min) = self.min_size {
            raw.min_size = min;
        }
        if let Some(max) = self.max_size {
            raw.max_size = max;
        }
        if let Some(connectivity) = self.connectivity {
            raw.connectivity = connectivity;
        }
        if let Some(delimiter) = self.delimiter {
            raw.delimiter = match delimiter {
                DelimiterArg::Tab => "tab",
                DelimiterArg::Comma => "comma",
            }
            .to_string();
        }
        if let Some(format) = self.overlay_format {
            raw.overlay_format = match format {
                OverlayArg::Png => "png",
                OverlayArg::Jpg => "jpg",
            }
            .to_string();
        }
        Ok(raw.into_config()?)
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::CheckConfig(args) => check_config(&args),
    }
}

fn run(args: &RunArgs) -> CliResult<()> {
    let config = args.config.resolve()?;
    let mut options = BatchOptions::new(&args.input, &args.output).with_keep_going(args.keep_going);
    if let Some(compare) = &args.compare {
        options = options.with_compare_dir(compare);
    }

    let report = run_batch(&config, &options)?;
    tracing::info!(
        "{} images, {} objects, results in {}",
        report.processed.len(),
        report.region_count(),
        args.output.display()
    );

    if report.is_success() {
        Ok(())
    } else {
        Err(format!("{} of the images failed", report.failed.len()).into())
    }
}

fn check_config(args: &ConfigArgs) -> CliResult<()> {
    let config = args.resolve()?;
    println!("{}", config.to_raw().to_json_pretty()?);
    Ok(())
}
