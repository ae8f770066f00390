//! A single pinned worker sweeping its slice of the domain.
//!
//! The orchestrator builds one [`WorkerHandle`] per core and hands each to a
//! [`Worker`] running on its own thread. The worker owns its output file
//! exclusively; the only state it shares is the read-only
//! [`CancellationFlag`].

use crate::{CancellationFlag, CoreId, Error, PrimalityRule, SubRange};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Builds the path of the output file for the worker at zero-based `index`.
///
/// Files are named `PRIMES_THREAD_<index>.TXT`. The index in the name is
/// zero-based even though worker ordinals are one-based.
pub fn output_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("PRIMES_THREAD_{index}.TXT"))
}

/// Everything a worker needs to know about its assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerHandle {
    ordinal: usize,
    core: CoreId,
    range: SubRange,
    output: PathBuf,
}

impl WorkerHandle {
    /// Describes the worker at zero-based `index`, writing into `output_dir`.
    pub fn new(index: usize, range: SubRange, output_dir: &Path) -> Self {
        Self {
            ordinal: index + 1,
            core: CoreId::from_index(index),
            range,
            output: output_path(output_dir, index),
        }
    }

    /// One-based position of this worker.
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub const fn core(&self) -> CoreId {
        self.core
    }

    pub const fn range(&self) -> SubRange {
        self.range
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// Terminal state of a worker.
#[derive(Debug)]
pub enum WorkerOutcome {
    /// The sweep ended, either because the range was exhausted or because
    /// cancellation was observed. Partial output is valid output.
    Completed(Sweep),
    /// The worker could not produce its output file.
    Aborted(Error),
}

impl WorkerOutcome {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The sweep summary, if the worker completed.
    pub const fn sweep(&self) -> Option<&Sweep> {
        match self {
            Self::Completed(sweep) => Some(sweep),
            Self::Aborted(_) => None,
        }
    }
}

/// Summary of one sweep over a [`SubRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    /// Number of primes written.
    pub primes: u64,
    /// First value that was not tested. Equals the range end when the sweep
    /// ran to completion.
    pub next: usize,
    /// Whether the sweep stopped early on cancellation.
    pub cancelled: bool,
}

/// Drives the primality oracle over one [`SubRange`].
#[derive(Debug)]
pub struct Worker<'a> {
    handle: &'a WorkerHandle,
    rule: PrimalityRule,
    cancel: CancellationFlag,
}

impl<'a> Worker<'a> {
    pub fn new(
        handle: &'a WorkerHandle,
        rule: PrimalityRule,
        cancel: CancellationFlag,
    ) -> Self {
        Self {
            handle,
            rule,
            cancel,
        }
    }

    /// Opens the output file, sweeps the range into it and closes it.
    ///
    /// The file is created or truncated. Everything written is flushed before
    /// this returns, so a completed worker's file is final.
    pub fn run(self) -> WorkerOutcome {
        let ordinal = self.handle.ordinal();
        let path = self.handle.output();

        let _span =
            tracing::info_span!("worker", ordinal, core = %self.handle.core()).entered();

        let file = match File::create(path) {
            Ok(file) => file,
            Err(source) => {
                tracing::error!(path = %path.display(), "could not open output: {source}");
                return WorkerOutcome::Aborted(Error::OpenOutput {
                    ordinal,
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        tracing::debug!(range = %self.handle.range(), path = %path.display(), "worker running");

        let mut out = BufWriter::new(file);
        let swept = self.sweep(&mut out).and_then(|sweep| {
            out.flush()?;
            Ok(sweep)
        });

        match swept {
            Ok(sweep) => {
                tracing::debug!(
                    primes = sweep.primes,
                    next = sweep.next,
                    cancelled = sweep.cancelled,
                    "worker finished"
                );
                WorkerOutcome::Completed(sweep)
            }
            Err(source) => {
                tracing::error!(path = %path.display(), "could not write output: {source}");
                WorkerOutcome::Aborted(Error::WriteOutput {
                    ordinal,
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Tests every value of the range in increasing order and writes each
    /// prime to `out`, one decimal per line.
    ///
    /// The cancellation flag is checked before each value.
    ///
    /// # Errors
    ///
    /// Returns the first write error from `out`.
    pub fn sweep<W: Write>(&self, out: &mut W) -> io::Result<Sweep> {
        let mut primes = 0;
        for n in self.handle.range().iter() {
            if self.cancel.is_cancelled() {
                return Ok(Sweep {
                    primes,
                    next: n,
                    cancelled: true,
                });
            }
            if self.rule.is_prime(n) {
                writeln!(out, "{n}")?;
                primes += 1;
            }
        }

        Ok(Sweep {
            primes,
            next: self.handle.range().end(),
            cancelled: false,
        })
    }
}
