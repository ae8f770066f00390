use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation shared between the signal path and every worker.
///
/// The flag moves from `false` to `true` at most once. Workers poll it on every
/// iteration of their hot loop, so both sides use relaxed ordering: a worker
/// may run a few more iterations after [`cancel`](Self::cancel) before it
/// notices, which is fine since no other data is published through the flag.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = CancellationFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_cancelled());

        flag.cancel();
        assert!(observer.is_cancelled());

        flag.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn visible_across_threads() {
        let flag = CancellationFlag::new();
        std::thread::scope(|s| {
            let observer = flag.clone();
            let waiter = s.spawn(move || {
                while !observer.is_cancelled() {
                    std::hint::spin_loop();
                }
            });
            flag.cancel();
            waiter.join().unwrap();
        });
    }
}
