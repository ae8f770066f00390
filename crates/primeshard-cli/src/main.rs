#![doc = include_str!("../README.md")]

mod app;

use anyhow::{Context, bail};
use app::config::CliArgs;
use app::signal::QuitSignal;
use app::telemetry::init_telemetry;
use clap::Parser;
use primeshard::{CancellationFlag, Orchestrator, RunConfig, RunReport};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;

    // Hooked before any worker exists so an early quit is never missed.
    let mut quit = QuitSignal::install().context("could not set up SIGQUIT")?;

    let cancel = CancellationFlag::new();
    let orchestrator = Orchestrator::new(config, cancel.clone());
    log_startup_info(orchestrator.config());

    let mut run = tokio::task::spawn_blocking(move || orchestrator.run());
    let joined = tokio::select! {
        joined = &mut run => joined,
        signal = quit.recv() => {
            tracing::info!(signal, "Received quit signal, cancelling workers");
            cancel.cancel();
            run.await
        }
    };

    let report = joined.context("orchestrator task failed")??;
    log_summary(&report);

    if !report.is_success() {
        bail!(
            "run failed with {} orchestration error(s)",
            report.failures().len()
        );
    }
    Ok(())
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting prime search with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting prime search below {} on {} workers",
            config.domain_max,
            config
                .workers
                .map_or_else(|| "all available".to_owned(), |n| n.to_string())
        );
    }
}

fn log_summary(report: &RunReport) {
    tracing::info!(
        workers = report.workers().len(),
        primes = report.primes_found(),
        cancelled = report.cancelled(),
        aborted = report.aborted(),
        failures = report.failures().len(),
        "Prime search finished"
    );
}
