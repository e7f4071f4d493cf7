//! Execution-context probing and the per-unit dispatch cache.

use std::sync::atomic::{AtomicBool, Ordering};

/// Where the calling thread is executing, observed for a single dispatch.
///
/// Transient: computed per call and never stored beyond the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// The calling thread has an active scheduler bound to it.
    Scheduled,
    /// Plain synchronous code with no scheduler on this thread.
    Unscheduled,
}

/// Answers "is the calling thread currently inside an active scheduler?".
///
/// Pure query: no side effects, safe to call concurrently from any thread, and
/// it must never allocate a scheduler while probing. Absence of a scheduler is
/// a normal answer, not an error. The probe is a trait so tests can inject a
/// counting or fixed-answer implementation and observe how often dispatch
/// actually probes.
pub trait ContextProbe: Send + Sync {
    /// Detect the calling thread's current execution context.
    fn detect(&self) -> ExecutionContext;
}

/// One-way dispatch cache owned by each wrapped unit.
///
/// The flag latches to `true` the first time the unit is observed in scheduled
/// context and is never cleared by normal dispatch; only [`reset`] does that.
///
/// The flag is advisory, not a source of truth. It is read and written with
/// relaxed ordering and no lock: a thread that observes a stale `false` merely
/// re-probes once more than strictly necessary, and re-probing is always safe.
/// A `true` skips the probe, which is safe only under the assumption that a
/// unit observed in scheduled context keeps being called from scheduled
/// context. Callers that reuse one unit across a long-lived scheduled worker
/// and an unrelated unscheduled call site violate that assumption and will
/// receive a pending handle with no scheduler to resolve it; see the crate
/// docs for this hazard.
///
/// [`reset`]: DispatchCache::reset
#[derive(Debug, Default)]
pub struct DispatchCache {
    scheduled_seen: AtomicBool,
}

impl DispatchCache {
    /// Create a cache with the flag cleared.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scheduled_seen: AtomicBool::new(false),
        }
    }

    /// Read the latch. Safe to call concurrently with writes.
    pub fn read(&self) -> bool {
        self.scheduled_seen.load(Ordering::Relaxed)
    }

    /// Latch the flag. Idempotent.
    pub fn mark_scheduled(&self) {
        self.scheduled_seen.store(true, Ordering::Relaxed);
    }

    /// Clear the latch.
    ///
    /// Diagnostic/test hook only; production dispatch never calls this.
    pub fn reset(&self) {
        self.scheduled_seen.store(false, Ordering::Relaxed);
    }
}
