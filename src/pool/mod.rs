//! Worker-pool abstraction for offloaded blocking work.
//!
//! The dispatch core never owns or sizes the pool; it only submits jobs
//! through [`OffloadPool`]. The stock implementation is [`ThreadPool`], a set
//! of dedicated OS threads behind a bounded queue. Applications that already
//! run a multi-threaded tokio runtime can use
//! [`crate::runtime::TokioBlockingPool`] instead.

mod threaded;

pub use threaded::ThreadPool;

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// A unit of blocking work accepted by an offload pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Reasons a pool can refuse a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The job queue is full; no more jobs can be accepted right now.
    #[error("worker queue is full")]
    QueueFull,
    /// The pool has been shut down.
    #[error("worker pool has shut down")]
    Shutdown,
}

/// Errors constructing a pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Abstraction over the worker-thread pool that runs offloaded blocking work.
pub trait OffloadPool: Send + Sync {
    /// Submit a job for execution on a worker thread.
    ///
    /// Must return without running the job on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] when the pool cannot accept the job; the
    /// dispatch layer surfaces that to the caller and never retries.
    fn submit(&self, job: Job) -> Result<(), SubmitError>;
}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,
    /// Jobs accepted into the queue so far.
    pub submitted_jobs: u64,
    /// Jobs that finished executing (including panicked ones).
    pub completed_jobs: u64,
    /// Submissions refused because the queue was full or the pool shut down.
    pub rejected_jobs: u64,
    /// Jobs currently waiting in the queue.
    pub queued_jobs: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted_jobs: AtomicU64,
    pub completed_jobs: AtomicU64,
    pub rejected_jobs: AtomicU64,
    pub queued_jobs: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, worker_count: usize) -> PoolStats {
        PoolStats {
            worker_count,
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            rejected_jobs: self.rejected_jobs.load(Ordering::Relaxed),
            queued_jobs: self.queued_jobs.load(Ordering::Relaxed),
        }
    }
}
