//! Spawning, supervising and rolling back the per-core workers.
//!
//! [`Orchestrator::run`] partitions the domain, starts one pinned thread per
//! core and waits for all of them. Threads are spawned inside
//! [`std::thread::scope`], so every thread that was started is joined on
//! every exit path, including the rollback after a failed spawn.
//!
//! A spawn only counts as successful once the new thread reports that it is
//! bound to its core. Workers are therefore started strictly in order, and a
//! failure at worker `k` leaves workers `k + 1..` uncreated.

use crate::{
    CancellationFlag, CorePinner, DOMAIN_MAX, Error, OsCorePinner, PrimalityRule,
    RemainderPolicy, Result, Worker, WorkerHandle, WorkerOutcome, available_cores, partition,
};
use core::any::Any;
use core::num::NonZeroUsize;
use std::io;
use std::path::PathBuf;
use std::thread::{self, Scope, ScopedJoinHandle};


/// Default worker stack size: eight times glibc's `PTHREAD_STACK_MIN`.
pub const DEFAULT_STACK_SIZE: usize = 8 * 16 * 1024;

/// Parameters of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of workers. Detected from the host when `None`.
    pub workers: Option<NonZeroUsize>,
    /// Exclusive upper bound of the searched domain.
    pub domain_max: usize,
    /// Directory receiving the output files. The current working directory
    /// when `None`.
    pub output_dir: Option<PathBuf>,
    /// Stack size of each worker thread, in bytes.
    pub stack_size: usize,
    pub remainder: RemainderPolicy,
    pub primality: PrimalityRule,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: None,
            domain_max: DOMAIN_MAX,
            output_dir: None,
            stack_size: DEFAULT_STACK_SIZE,
            remainder: RemainderPolicy::default(),
            primality: PrimalityRule::default(),
        }
    }
}

/// How a single worker ended.
#[derive(Debug)]
pub struct WorkerReport {
    pub handle: WorkerHandle,
    pub outcome: WorkerOutcome,
}

/// Result of a run that got as far as spawning workers.
///
/// The run failed if any orchestration error was recorded. Workers that
/// aborted on their own output file are listed in [`workers`](Self::workers)
/// but do not fail the run.
#[derive(Debug, Default)]
pub struct RunReport {
    workers: Vec<WorkerReport>,
    failures: Vec<Error>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Workers that reached a terminal state, in the order they were joined.
    pub fn workers(&self) -> &[WorkerReport] {
        &self.workers
    }

    /// Spawn and join failures, in the order they occurred.
    pub fn failures(&self) -> &[Error] {
        &self.failures
    }

    /// Total primes written across all completed workers.
    pub fn primes_found(&self) -> u64 {
        self.workers
            .iter()
            .filter_map(|w| w.outcome.sweep())
            .map(|sweep| sweep.primes)
            .sum()
    }

    /// Number of workers that stopped early on cancellation.
    pub fn cancelled(&self) -> usize {
        self.workers
            .iter()
            .filter_map(|w| w.outcome.sweep())
            .filter(|sweep| sweep.cancelled)
            .count()
    }

    /// Number of workers that aborted on an output error.
    pub fn aborted(&self) -> usize {
        self.workers
            .iter()
            .filter(|w| !w.outcome.is_completed())
            .count()
    }
}

type WorkerThread<'scope> = ScopedJoinHandle<'scope, WorkerOutcome>;

/// Runs one pinned worker per core over a partitioned domain.
#[derive(Debug)]
pub struct Orchestrator<P = OsCorePinner> {
    config: RunConfig,
    cancel: CancellationFlag,
    pinner: P,
}

impl Orchestrator {
    /// Creates an orchestrator pinning workers through the OS scheduler.
    ///
    /// `cancel` is the flag the caller's signal path sets; it is also set
    /// when a failed spawn forces a rollback.
    pub fn new(config: RunConfig, cancel: CancellationFlag) -> Self {
        Self::with_pinner(config, cancel, OsCorePinner)
    }
}

impl<P: CorePinner> Orchestrator<P> {
    pub fn with_pinner(config: RunConfig, cancel: CancellationFlag, pinner: P) -> Self {
        Self {
            config,
            cancel,
            pinner,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Builds one [`WorkerHandle`] per core without starting anything.
    ///
    /// # Errors
    ///
    /// - [`Error::CoreQuery`] if the core count must be detected and cannot
    ///   be.
    /// - [`Error::TooManyWorkers`] if there are more workers than values in
    ///   the domain.
    /// - [`Error::OutputDir`] if the current directory cannot be resolved.
    pub fn plan(&self) -> Result<Vec<WorkerHandle>> {
        let cores = match self.config.workers {
            Some(cores) => cores,
            None => available_cores()?,
        };
        if cores.get() > self.config.domain_max {
            return Err(Error::TooManyWorkers {
                workers: cores.get(),
                domain_max: self.config.domain_max,
            });
        }
        let output_dir = match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(Error::OutputDir)?,
        };

        let ranges = partition(self.config.domain_max, cores.get(), self.config.remainder)?;
        Ok(ranges
            .into_iter()
            .enumerate()
            .map(|(index, range)| WorkerHandle::new(index, range, &output_dir))
            .collect())
    }

    /// Spawns every worker, waits for all of them and reports how they ended.
    ///
    /// If worker `k` cannot be spawned or bound, the cancellation flag is set,
    /// workers `1..k` are joined in reverse order and no further workers are
    /// created. Join failures are recorded and the remaining workers are
    /// still awaited.
    ///
    /// # Errors
    ///
    /// Returns an error only if the run could not be planned (see
    /// [`plan`](Self::plan)). Spawn and join failures are reported through
    /// [`RunReport::failures`].
    pub fn run(&self) -> Result<RunReport> {
        let handles = self.plan()?;
        let mut report = RunReport {
            workers: Vec::with_capacity(handles.len()),
            failures: Vec::new(),
        };

        tracing::info!(
            workers = handles.len(),
            domain_max = self.config.domain_max,
            "starting workers"
        );

        thread::scope(|scope| {
            let mut spawned = Vec::with_capacity(handles.len());

            for handle in &handles {
                match self.spawn(scope, handle) {
                    Ok(thread) => spawned.push((handle, thread)),
                    Err(err) => {
                        tracing::error!("{err}");
                        report.failures.push(err);
                        self.rollback(spawned, &mut report);
                        return;
                    }
                }
            }

            for (handle, thread) in spawned {
                collect(handle, thread, &mut report);
            }
        });

        Ok(report)
    }

    fn spawn<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        handle: &'env WorkerHandle,
    ) -> Result<WorkerThread<'scope>> {
        let ordinal = handle.ordinal();
        let core = handle.core();
        let worker = Worker::new(handle, self.config.primality, self.cancel.clone());
        let pinner = &self.pinner;
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let thread = thread::Builder::new()
            .name(format!("primes-{ordinal}"))
            .stack_size(self.config.stack_size)
            .spawn_scoped(scope, move || {
                // The receiver outlives both sends.
                if let Err(source) = pinner.pin_current(core) {
                    let _ = ready_tx.send(false);
                    return WorkerOutcome::Aborted(Error::Spawn {
                        ordinal,
                        core,
                        source,
                    });
                }
                let _ = ready_tx.send(true);
                worker.run()
            })
            .map_err(|source| Error::Spawn {
                ordinal,
                core,
                source,
            })?;

        if ready_rx.recv().unwrap_or(false) {
            tracing::debug!(ordinal, %core, range = %handle.range(), "worker spawned");
            return Ok(thread);
        }

        // An unbound thread returns right after reporting, or has panicked.
        let reason = match thread.join() {
            Ok(WorkerOutcome::Aborted(err)) => return Err(err),
            Ok(WorkerOutcome::Completed(_)) => "thread exited".to_owned(),
            Err(payload) => panic_message(&*payload),
        };
        let source = io::Error::other(format!("worker died before binding to its core: {reason}"));

        Err(Error::Spawn {
            ordinal,
            core,
            source,
        })
    }

    fn rollback(&self, spawned: Vec<(&WorkerHandle, WorkerThread<'_>)>, report: &mut RunReport) {
        self.cancel.cancel();
        for (handle, thread) in spawned.into_iter().rev() {
            tracing::warn!(ordinal = handle.ordinal(), "cancelling worker");
            collect(handle, thread, report);
        }
    }
}

fn collect(handle: &WorkerHandle, thread: WorkerThread<'_>, report: &mut RunReport) {
    let ordinal = handle.ordinal();
    let reason = match thread.join() {
        Ok(outcome) => {
            record(handle, outcome, report);
            return;
        }
        Err(payload) => panic_message(&*payload),
    };

    let err = Error::Join { ordinal, reason };
    tracing::error!("{err}");
    report.failures.push(err);
}

fn record(handle: &WorkerHandle, outcome: WorkerOutcome, report: &mut RunReport) {
    let ordinal = handle.ordinal();
    match &outcome {
        WorkerOutcome::Completed(sweep) => tracing::info!(
            ordinal,
            primes = sweep.primes,
            next = sweep.next,
            cancelled = sweep.cancelled,
            "worker completed"
        ),
        WorkerOutcome::Aborted(_) => tracing::debug!(ordinal, "worker aborted"),
    }

    report.workers.push(WorkerReport {
        handle: handle.clone(),
        outcome,
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_owned()
    }
}
