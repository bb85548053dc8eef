//! Live Map Daemon
//!
//! Tails the system log and republishes live map signals (speed limits, road
//! signs, turn hints, map flags) as one structured event per log record.
//! It uses the livemap-decoder library and adds:
//! - TOML configuration with command-line overrides
//! - Logging setup
//! - SIGINT/SIGTERM handling
//! - Elevated scheduling priority

use anyhow::{Context, Result};
use clap::Parser;
use livemap_decoder::{
    FileParams, FileSource, JsonLinesPublisher, LogcatSource, Publisher, Runner, Shutdown,
    SignalEngine, UdpPublisher,
};
use std::path::PathBuf;

mod config;
mod priority;

use config::{AppConfig, PublishConfig, SourceConfig};

/// Live map daemon - derive live map signals from the system log
#[derive(Parser, Debug)]
#[command(name = "livemapd")]
#[command(about = "Republish live map signals found in the system log", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (livemapd.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replay a text log file (logcat -v epoch format) instead of running logcat
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// logcat binary to run
    #[arg(long, value_name = "PATH", conflicts_with = "replay")]
    logcat: Option<PathBuf>,

    /// Parameter directory
    #[arg(long, value_name = "DIR")]
    params_dir: Option<PathBuf>,

    /// Publish JSON datagrams to this address instead of stdout
    #[arg(long, value_name = "ADDR")]
    udp: Option<String>,

    /// Topic to publish on
    #[arg(long, value_name = "NAME")]
    topic: Option<String>,

    /// Scheduling priority (nice value, -20..19)
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    nice: Option<i32>,

    /// Stop after this many records (for testing)
    #[arg(long, value_name = "COUNT")]
    max_records: Option<u64>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Live map daemon v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", livemap_decoder::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    priority::raise_priority(config.process.nice);

    let shutdown = Shutdown::new();
    let handler_shutdown = shutdown.clone();
    ctrlc::set_handler(move || {
        log::info!("Shutdown requested");
        handler_shutdown.request();
    })
    .context("Failed to install signal handler")?;

    run(&config, shutdown, args.max_records)
}

/// Wire the configured source, store and publisher together and run until shutdown
fn run(config: &AppConfig, shutdown: Shutdown, max_records: Option<u64>) -> Result<()> {
    let mut params = FileParams::new(&config.params.dir);
    let mut publisher: Box<dyn Publisher> = match &config.publish {
        PublishConfig::Stdout => Box::new(JsonLinesPublisher::stdout()),
        PublishConfig::Udp { address } => Box::new(
            UdpPublisher::connect(address.as_str())
                .with_context(|| format!("Failed to set up UDP publisher for {}", address))?,
        ),
    };
    let mut engine = SignalEngine::new(config.engine.clone());
    let mut runner = Runner::new(config.runner.clone(), shutdown).with_max_records(max_records);

    let result = match &config.source {
        SourceConfig::Logcat(logcat) => {
            log::info!("Reading log buffers {:?} via {:?}", logcat.buffers, logcat.binary);
            let mut source = LogcatSource::new(logcat.clone());
            runner.run(&mut source, &mut engine, &mut params, publisher.as_mut())
        }
        SourceConfig::File { path } => {
            log::info!("Replaying log file {:?}", path);
            let mut source = FileSource::new(path);
            runner.run(&mut source, &mut engine, &mut params, publisher.as_mut())
        }
    };

    let stats = result.context("Log source could not be opened")?;
    log::info!("Processed {} records", stats.records);
    Ok(())
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(path) = &args.replay {
        config.source = SourceConfig::File { path: path.clone() };
    }
    if let Some(binary) = &args.logcat {
        match &mut config.source {
            SourceConfig::Logcat(logcat) => logcat.binary = binary.clone(),
            SourceConfig::File { .. } => {
                config.source = SourceConfig::Logcat(
                    livemap_decoder::LogcatConfig::default().with_binary(binary.clone()),
                );
            }
        }
    }
    if let Some(dir) = &args.params_dir {
        config.params.dir = dir.clone();
    }
    if let Some(address) = &args.udp {
        config.publish = PublishConfig::Udp {
            address: address.clone(),
        };
    }
    if let Some(topic) = &args.topic {
        config.runner.topic = topic.clone();
    }
    if let Some(nice) = args.nice {
        config.process.nice = nice;
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
