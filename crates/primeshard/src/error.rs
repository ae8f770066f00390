//! Error types for a prime search run.
//!
//! The [`Error`] enum covers both orchestration failures (core enumeration,
//! spawning, joining) and per-worker I/O failures. Only the former decide
//! whether a run failed; the latter stay local to the worker that hit them.

use crate::CoreId;
use std::io;
use std::path::PathBuf;

/// A result type defaulting to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors a run can surface.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The domain cannot be split across zero workers.
    #[error("core count must be greater than 0")]
    NoCores,

    /// More workers than values to search, leaving some with empty ranges.
    #[error("{workers} workers exceed the domain bound {domain_max}; some ranges would be empty")]
    TooManyWorkers { workers: usize, domain_max: usize },

    /// The host could not report how many cores are available.
    #[error("can't enumerate number of CPU cores: {0}")]
    CoreQuery(#[source] io::Error),

    /// The directory receiving the output files could not be resolved.
    #[error("can't resolve output directory: {0}")]
    OutputDir(#[source] io::Error),

    /// A worker thread could not be created or bound to its core.
    #[error("could not spawn worker {ordinal} on {core}: {source}")]
    Spawn {
        ordinal: usize,
        core: CoreId,
        #[source]
        source: io::Error,
    },

    /// A worker thread terminated abnormally.
    #[error("worker {ordinal} could not be joined: {reason}")]
    Join { ordinal: usize, reason: String },

    /// A worker could not create its output file.
    #[error("could not open {} on worker {ordinal}: {source}", .path.display())]
    OpenOutput {
        ordinal: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A worker failed while appending to its output file.
    #[error("could not write {} on worker {ordinal}: {source}", .path.display())]
    WriteOutput {
        ordinal: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
