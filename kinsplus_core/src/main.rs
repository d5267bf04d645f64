//! # kinsplus binary
//!
//! Hosts the kinematics adapter: loads the configuration, creates the pins,
//! registers the extra-joint update on the cyclic thread and runs it until
//! shutdown.
//!
//! # Usage
//!
//! ```bash
//! # Identity kinematics over all nine axes
//! kinsplus
//!
//! # Three kinematic joints plus two extra joints
//! kinsplus --coordinates XYZ --extra-joints 2
//!
//! # From a config file, with verbose logging
//! kinsplus --config config/kinsplus.toml -v
//! ```

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use kinsplus_core::config::{AdapterConfig, load_config};
use kinsplus_core::setup::KinsAdapter;
use kinsplus_hal::thread::{CyclicThread, rt_setup};
use kinsplus_hal::{HalError, PinRegistry};

/// kinsplus - identity kinematics adapter with extra joints
#[derive(Parser, Debug)]
#[command(name = "kinsplus")]
#[command(version)]
#[command(about = "Identity kinematics adapter with auxiliary pre/post-home joints")]
struct Args {
    /// Path to the adapter configuration file (kinsplus.toml).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Component name, prefixes all pin names (overrides config).
    #[arg(long)]
    name: Option<String>,

    /// Axis letters ordered for joint assignment (overrides config).
    #[arg(long)]
    coordinates: Option<String>,

    /// Number of extra joints outside the kinematics (overrides config).
    #[arg(long)]
    extra_joints: Option<i32>,

    /// Kinematics mode selector: 1, b, f or i (overrides config).
    #[arg(long)]
    kins_type: Option<String>,

    /// Control cycle period in microseconds (overrides config).
    #[arg(long)]
    cycle_time_us: Option<u32>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("kinsplus startup failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    info!("kinsplus v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AdapterConfig::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    let mut registry = PinRegistry::new();
    let adapter = KinsAdapter::setup(&config, &mut registry)?;
    for name in registry.names() {
        info!("pin: {name}");
    }

    let mut thread = CyclicThread::new(Duration::from_micros(config.cycle_time_us as u64));
    let extra = adapter.extra().clone();
    thread.add_funct(
        &format!("{}.extrajoints.update", config.name),
        Box::new(move |period_ns| extra.update(period_ns)),
    )?;

    // No-op without the rt feature.
    rt_setup(config.cpu_core, config.rt_priority)?;

    let running = thread.running_flag();
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })?;

    info!(
        "entering cycle loop (period={}us, functs: {})",
        config.cycle_time_us,
        thread.funct_names().collect::<Vec<_>>().join(", ")
    );
    let result: Result<(), HalError> = thread.run();

    let stats = thread.stats();
    info!(
        "stopped after {} cycles (avg={}ns, max={}ns, violations={})",
        stats.cycle_count,
        stats.avg_cycle_ns(),
        stats.max_cycle_ns,
        stats.violations
    );
    result?;
    Ok(())
}

fn apply_overrides(config: &mut AdapterConfig, args: &Args) {
    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    if let Some(coordinates) = &args.coordinates {
        config.coordinates = coordinates.clone();
    }
    if let Some(extra_joints) = args.extra_joints {
        config.extra_joints = extra_joints;
    }
    if let Some(kins_type) = &args.kins_type {
        config.kins_type = kins_type.clone();
    }
    if let Some(cycle_time_us) = args.cycle_time_us {
        config.cycle_time_us = cycle_time_us;
    }
}

fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
