//! # lcdlink
//!
//! Reads live sensor telemetry from a monitoring application's shared
//! memory and drives an external character LCD over a serial link:
//! snapshot → catalog → fixed-width frame → control-byte stream.
//!
//! The loop runs at a nominal 1 Hz; every tick-level failure (producer
//! offline, corrupt region, wedged port) becomes a status line and an
//! error frame on the display, never a crash. Only configuration errors
//! are fatal at startup.

use clap::Parser;
use lcdlink::config;
use lcdlink::service::Service;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// lcdlink — sensor telemetry to character LCD bridge
#[derive(Parser, Debug)]
#[command(name = "lcdlink")]
#[command(version)]
#[command(about = "Drives a serial character LCD from shared-memory sensor telemetry")]
struct Args {
    /// Path to the daemon configuration TOML.
    #[arg(default_value = "config/lcdlink.toml")]
    config: PathBuf,

    /// Override the configured serial port (e.g. /dev/ttyUSB0, or TEST
    /// for the loopback sink).
    #[arg(long)]
    port: Option<String>,

    /// Decode one snapshot, print all readings to stdout, and exit.
    #[arg(long)]
    dump: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("lcdlink v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut loaded = config::load(&args.config)?;
    if let Some(ref port) = args.port {
        loaded.daemon.port = port.clone();
    }

    if args.dump {
        return dump_snapshot(&loaded.daemon.region_name);
    }

    info!(
        region = %loaded.daemon.region_name,
        port = %loaded.daemon.port,
        layout = %loaded.daemon.active_layout,
        "config OK"
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))?;

    let mut service = Service::new(loaded)?;
    service.run(&shutdown);

    info!("lcdlink shutdown complete");
    Ok(())
}

/// One-shot diagnostic: decode the region and list every reading.
fn dump_snapshot(region_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    use lcdlink_sensors::SensorRegion;

    let region = SensorRegion::open(region_name)?;
    let header = region.read_header()?;
    let snapshot = region.read_snapshot()?;

    println!(
        "region {region_name}: version {}.{}, poll_time {}, {} readings",
        header.version,
        header.revision,
        snapshot.poll_time,
        snapshot.len()
    );
    for reading in &snapshot.readings {
        println!(
            "{:<12} {:<40} {:>12.3} {}",
            format!("{:?}", reading.reading_type),
            reading.label_orig,
            reading.value,
            reading.unit
        );
    }
    Ok(())
}

/// Set up the tracing subscriber from CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .compact()
        .init();
}
