#![doc = include_str!("../README.md")]

mod probe;

use anyhow::bail;
use clap::Parser;
use probe::config::{CliArgs, ProbeConfig};
use probe::harness::run;
use probe::telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ProbeConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let report = run(&config)?;
    println!("{report}");

    if !report.is_clean() {
        bail!(
            "expected {} unique IDs, got {} ({} duplicates)",
            report.expected,
            report.unique,
            report.duplicates()
        );
    }
    Ok(())
}

fn log_startup_info(config: &ProbeConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting probe with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting probe against {} {:?} generator(s) with layout {}/{}/{}",
            config.num_workers,
            config.generator,
            config.layout.timestamp_bits(),
            config.layout.worker_bits(),
            config.layout.sequence_bits()
        );
    }
}
