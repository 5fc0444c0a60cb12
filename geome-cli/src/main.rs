use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use geome_lib::{
    discover::{discover, DEFAULT_PATTERN},
    geocode::{
        CachingGeocoder, Geocoder, Nominatim, NominatimConfig, OfflineGeocoder, RetryPolicy,
        DEFAULT_ENDPOINT, MAX_CACHE_PRECISION,
    },
    EmbeddedExif, Exiftool, MetadataProvider, NamingMode, Pipeline,
};
use geome_util::CanonicalizedPathBuf;
use slog::{info, Logger};
use sloggers::{
    terminal::{Destination, TerminalLoggerBuilder},
    types::Severity,
    Build,
};

/// Geolocate videos and images from their EXIF data and sort them up by place
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Root where to start geolocating from
    root: CanonicalizedPathBuf,
    /// Where to relocate videos and images once located, created if missing
    #[arg(long)]
    destination: PathBuf,
    /// What information to use for renaming the file: date or date+location
    #[arg(long, default_value_t = NamingMode::Date)]
    format: NamingMode,
    /// File discovery pattern, relative to root
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pattern: String,
    /// Where metadata comes from
    #[arg(long, value_enum, default_value_t = MetadataSource::Exiftool)]
    metadata_source: MetadataSource,
    /// exiftool binary to run
    #[arg(long, default_value = "exiftool")]
    exiftool: PathBuf,
    /// Reverse geocoding backend
    #[arg(long, value_enum, default_value_t = GeocoderKind::Nominatim)]
    geocoder: GeocoderKind,
    /// Nominatim reverse endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    nominatim_url: String,
    /// User agent sent to Nominatim
    #[arg(long)]
    user_agent: Option<String>,
    /// Preferred language for place names, e.g. "en"
    #[arg(long)]
    language: Option<String>,
    /// Geocoding request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,
    /// Attempts per geocoding lookup
    #[arg(long, default_value_t = 3)]
    retries: u32,
    /// Minimum pause between geocoding requests in milliseconds
    #[arg(long, default_value_t = 1000)]
    min_interval_ms: u64,
    /// Reuse addresses within this run for coordinates equal to this many decimals
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_CACHE_PRECISION as i64))]
    cache_precision: Option<u32>,
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetadataSource {
    /// Run exiftool on every file
    Exiftool,
    /// Read EXIF directly, images only
    Embedded,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GeocoderKind {
    Nominatim,
    /// Nearest place from a bundled table, no network
    Offline,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl From<LogLevel> for Severity {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Severity::Trace,
            LogLevel::Debug => Severity::Debug,
            LogLevel::Info => Severity::Info,
            LogLevel::Warning => Severity::Warning,
            LogLevel::Error => Severity::Error,
            LogLevel::Critical => Severity::Critical,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = TerminalLoggerBuilder::new();
    builder.level(args.log_level.into());
    builder.destination(Destination::Stderr);
    let logger = builder.build().context("cannot build logger")?;

    let destination = CanonicalizedPathBuf::create_dir_all(&args.destination)
        .with_context(|| format!("cannot use destination {}", args.destination.display()))?;
    let metadata: Box<dyn MetadataProvider> = match args.metadata_source {
        MetadataSource::Exiftool => Box::new(Exiftool::new(&args.exiftool)),
        MetadataSource::Embedded => Box::new(EmbeddedExif),
    };
    let geocoder = build_geocoder(&args, &logger)?;
    let paths = discover(args.root.as_path(), &args.pattern, &logger)
        .with_context(|| format!("invalid pattern {:?}", args.pattern))?;

    info!(logger, "starting";
        "root" => %args.root,
        "destination" => %destination,
        "format" => %args.format);
    let pipeline = Pipeline::new(metadata, geocoder, destination, args.format, logger);
    let report = pipeline.run(paths);

    println!(
        "{} moved, {} duplicates, {} conflicts, {} without location, {} failed",
        report.moved, report.duplicates, report.conflicts, report.untaggable, report.failed
    );
    Ok(())
}

fn build_geocoder(args: &Args, logger: &Logger) -> Result<Box<dyn Geocoder>> {
    let geocoder: Box<dyn Geocoder> = match args.geocoder {
        GeocoderKind::Nominatim => {
            let defaults = NominatimConfig::default();
            let config = NominatimConfig {
                endpoint: args.nominatim_url.clone(),
                user_agent: args.user_agent.clone().unwrap_or(defaults.user_agent),
                language: args.language.clone(),
                timeout: Duration::from_secs(args.timeout),
                retry: RetryPolicy {
                    max_attempts: args.retries.max(1),
                    ..defaults.retry
                },
                min_interval: Duration::from_millis(args.min_interval_ms),
            };
            Box::new(Nominatim::new(config, logger.clone()).context("cannot build geocoding client")?)
        }
        GeocoderKind::Offline => Box::new(OfflineGeocoder::new(logger.clone())),
    };
    Ok(match args.cache_precision {
        Some(precision) => Box::new(CachingGeocoder::new(geocoder, precision, logger.clone())),
        None => geocoder,
    })
}
