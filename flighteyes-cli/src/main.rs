//! FlightEyes CLI
//!
//! Builds an aerial mosaic around a longitude/latitude and optionally sets
//! it as the desktop background.
//!
//! ```text
//! flighteyes -122.39599 37.78858 30000 --output sf.jpg
//! ```

mod error;
mod progress;
mod wallpaper;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;
use flighteyes::cache::{CachedTileSource, DailyTileCache};
use flighteyes::config::{fetch_mode_for, ConfigFile};
use flighteyes::coord::{GeoPoint, DEFAULT_ALTITUDE};
use flighteyes::logging::{init_logging_with_writer, LoggingOptions};
use flighteyes::pipeline::Pipeline;
use flighteyes::provider::{BingMapsProvider, ReqwestClient};
use tracing::{info, warn};

use error::CliError;
use progress::TileProgress;
use wallpaper::{SystemWallpaper, WallpaperSetter};

/// Output file used when neither the command line nor the config names one.
const DEFAULT_OUTPUT: &str = "background.jpg";

#[derive(Debug, Parser)]
#[command(name = "flighteyes")]
#[command(version, about = "Stitch aerial imagery around a point into one image")]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Longitude in degrees, positive east
    lon: f64,

    /// Latitude in degrees, positive north
    lat: f64,

    /// Viewing altitude; lower is more detailed
    #[arg(default_value_t = DEFAULT_ALTITUDE)]
    altitude: f64,

    /// Where to write the mosaic (format follows the extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not set the desktop background
    #[arg(long)]
    no_wallpaper: bool,

    /// Fetch up to N tiles at once
    #[arg(long, value_name = "N")]
    parallel: Option<usize>,

    /// Always download tiles, bypassing the disk cache
    #[arg(long)]
    no_cache: bool,

    /// Delete cached tiles from previous days before running
    #[arg(long)]
    prune_cache: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn validate(&self) -> Result<(), CliError> {
        for (name, value) in [
            ("longitude", self.lon),
            ("latitude", self.lat),
            ("altitude", self.altitude),
        ] {
            if !value.is_finite() {
                return Err(CliError::Usage(format!("{} must be a finite number", name)));
            }
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    cli.validate()?;

    let config = match &cli.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    let progress = Arc::new(if cli.verbose {
        TileProgress::hidden()
    } else {
        TileProgress::new()
    });
    let _log_guard = init_logging_with_writer(
        &LoggingOptions {
            verbose: cli.verbose,
            directory: config.logging.directory.clone(),
        },
        progress.log_writer(),
    )?;

    let source = build_source(&cli, &config)?;
    let output = resolve_output(cli.output.as_deref(), &config);
    let fetch_mode = cli
        .parallel
        .map(fetch_mode_for)
        .unwrap_or_else(|| config.mosaic.fetch_mode());

    let pipeline = Pipeline::default().with_fetch_mode(fetch_mode);
    let plan = pipeline.plan(GeoPoint::new(cli.lon, cli.lat), cli.altitude)?;
    info!(quadkeys = %plan.matrix, "Tile matrix");

    progress.start(plan.matrix.len());
    let rendered = pipeline
        .with_progress(progress.clone())
        .render(&plan, &source, &output);
    progress.finish();
    let mosaic = rendered?;

    println!(
        "Wrote {} ({}×{} px, {} tiles at zoom {})",
        output.display(),
        mosaic.width(),
        mosaic.height(),
        plan.matrix.len(),
        plan.matrix.zoom()
    );

    if !cli.no_wallpaper && config.output.set_wallpaper {
        SystemWallpaper::default().apply(&output)?;
    }

    Ok(())
}

fn build_source(
    cli: &Cli,
    config: &ConfigFile,
) -> Result<CachedTileSource<BingMapsProvider<ReqwestClient>>, CliError> {
    let client = ReqwestClient::new(config.provider.timeout_secs)?;
    let mut provider =
        BingMapsProvider::new(client).with_url_template(config.provider.url_template.as_str());
    if !config.provider.api_key.is_empty() {
        provider = provider.with_api_key(config.provider.api_key.as_str());
    }

    if cli.no_cache || !config.cache.enabled {
        return Ok(CachedTileSource::uncached(provider));
    }

    let Some(directory) = config.cache.resolved_directory() else {
        warn!("No cache directory available, tiles will not be cached");
        return Ok(CachedTileSource::uncached(provider));
    };

    let cache = DailyTileCache::for_today(directory);
    if cli.prune_cache {
        let result = cache
            .prune_stale()
            .map_err(|e| CliError::Cache(e.to_string()))?;
        println!(
            "Pruned {} stale tiles ({} bytes)",
            result.files_deleted, result.bytes_freed
        );
    }

    Ok(CachedTileSource::new(provider, cache))
}

/// `--output`, then the config file, then [`DEFAULT_OUTPUT`].
fn resolve_output(cli_output: Option<&Path>, config: &ConfigFile) -> PathBuf {
    cli_output
        .map(Path::to_path_buf)
        .or_else(|| config.output.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}
