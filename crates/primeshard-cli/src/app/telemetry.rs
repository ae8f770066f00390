//! Log output for the binary.
//!
//! Everything goes to stderr through `tracing_subscriber::fmt`. Output files
//! only ever receive primes. Filtering follows `RUST_LOG` and defaults to
//! `info`; use `RUST_LOG=primeshard=debug` to see per-worker ranges and
//! spawn events.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()
        .context("failed to install the log subscriber")
}
