//! Core identities, core enumeration and thread pinning.
//!
//! Pinning sits behind the [`CorePinner`] trait so the orchestrator can be
//! driven by a test double that records or rejects bindings. [`OsCorePinner`]
//! is the real implementation and uses `sched_setaffinity(2)` on Linux.

use crate::{Error, Result};
use core::fmt;
use core::num::NonZeroUsize;
use std::io;

/// One-based identifier of the core a worker is bound to.
///
/// Worker `index` (zero-based) runs on `CoreId(index + 1)`, which maps back to
/// CPU `index` when talking to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreId(NonZeroUsize);

impl CoreId {
    /// The core assigned to the worker at zero-based position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index == usize::MAX`.
    pub const fn from_index(index: usize) -> Self {
        match NonZeroUsize::new(index.wrapping_add(1)) {
            Some(id) => Self(id),
            None => panic!("core index out of range"),
        }
    }

    /// The one-based identifier.
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// The zero-based CPU number handed to the OS.
    pub const fn cpu_index(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "core {}", self.0)
    }
}

/// Binds the calling thread to a single core.
///
/// Called exactly once, from inside the freshly spawned worker thread, before
/// the worker does any work. Implementations must be shareable across threads
/// because every worker calls the same instance.
pub trait CorePinner: Sync {
    /// Restricts the current thread to `core`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the binding was refused. The worker is then
    /// treated as never having been created.
    fn pin_current(&self, core: CoreId) -> io::Result<()>;
}

impl<P: CorePinner + ?Sized> CorePinner for &P {
    fn pin_current(&self, core: CoreId) -> io::Result<()> {
        (**self).pin_current(core)
    }
}

/// Pins threads through the operating system scheduler.
///
/// On targets without an affinity API the thread is left unpinned and a debug
/// event is emitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsCorePinner;

impl CorePinner for OsCorePinner {
    #[cfg(target_os = "linux")]
    fn pin_current(&self, core: CoreId) -> io::Result<()> {
        let cpu = core.cpu_index();
        if cpu >= libc::CPU_SETSIZE as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("CPU {cpu} exceeds the affinity mask size"),
            ));
        }

        // SAFETY: `cpu_set_t` is a plain bitmask for which all-zeroes is the
        // empty set, `cpu` was bounds-checked above, and pid 0 targets the
        // calling thread.
        let rc = unsafe {
            let mut set: libc::cpu_set_t = core::mem::zeroed();
            libc::CPU_SET(cpu, &mut set);
            libc::sched_setaffinity(0, core::mem::size_of::<libc::cpu_set_t>(), &set)
        };

        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        tracing::trace!(%core, cpu, "thread pinned");
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn pin_current(&self, core: CoreId) -> io::Result<()> {
        tracing::debug!(%core, "thread affinity unsupported on this target; leaving unpinned");
        Ok(())
    }
}

/// Number of cores available to this process.
///
/// # Errors
///
/// Returns [`Error::CoreQuery`] if the host cannot report it.
pub fn available_cores() -> Result<NonZeroUsize> {
    std::thread::available_parallelism().map_err(Error::CoreQuery)
}
