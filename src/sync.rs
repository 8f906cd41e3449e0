//! Synchronization primitives shared by sessions and the tunnel server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// A thread-safe stop flag for signalling background tasks to terminate.
///
/// Wraps `Arc<AtomicBool>` so the same flag can be observed from a pump
/// thread, the owning session and the accept loop without extra plumbing.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a new stop flag (initially not set).
    #[must_use]
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Check whether a stop has been requested.
    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Request a stop. Observable by every clone of this flag.
    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// A countdown latch for waiting on task completion.
///
/// The owner arms the latch with the number of pump threads a session
/// spawns; each thread counts down once on exit. `wait` blocks until the
/// count reaches zero, which is how the tunnel server serializes its accept
/// loop on the active session without joining threads it may be running on.
#[derive(Debug, Default)]
pub struct Latch {
    count: Mutex<usize>,
    cond: Condvar,
}

impl Latch {
    #[must_use]
    pub fn new() -> Self {
        Latch {
            count: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    /// Set the number of outstanding tasks. Called before any task starts.
    pub fn arm(&self, tasks: usize) {
        *self.count.lock() = tasks;
    }

    /// Count one task as finished, waking waiters when none remain.
    pub fn count_down(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.cond.notify_all();
        }
    }

    /// Block until every armed task has counted down.
    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.cond.wait(&mut count);
        }
    }

    /// Block until the count reaches zero or the timeout elapses.
    /// Returns `true` if the latch opened.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut count = self.count.lock();
        if *count == 0 {
            return true;
        }
        self.cond.wait_for(&mut count, timeout);
        *count == 0
    }
}
