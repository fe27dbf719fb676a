//! Console logging for the probe.
//!
//! Events go to stderr so the report on stdout stays parseable. The level is
//! taken from `RUST_LOG` and defaults to `info`. The library's `tracing`
//! feature is on for this binary, so clock anomalies and stalls surface as
//! `WARN` events; `RUST_LOG=snowmint=trace` adds a span per issued ID, which
//! is only useful for short runs.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_file(true)
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    Ok(())
}
